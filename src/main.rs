use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use due::input::parse_input;
use due::{AppError, LocalDT, Store, Task};

const DATABASE_FILE: &str = "todo.sqlite";
const HOME_DIR: &str = "due";

#[derive(Clone, PartialEq, Eq, Debug, Subcommand)]
enum Action {
    #[command(about = "List pending tasks")]
    List,
    #[command(about = "Add a new task", override_usage = "due add [description] [due ...]")]
    Add {
        #[arg(help = "task description, optionally ending in 'due <date>'")]
        words: Vec<String>,
    },
    #[command(about = "Edit an existing task")]
    Edit {
        #[arg(help = "task number as shown by list")]
        number: String,
    },
    #[command(about = "Mark a task as completed")]
    Do {
        #[arg(help = "task number as shown by list")]
        number: String,
    },
    #[command(about = "Archive completed tasks")]
    Archive,
}

#[derive(Parser, Debug)]
#[command(about = "a minimal commandline todo list")]
struct Args {
    #[arg(long, global = true, help = "Disable colored output")]
    no_color: bool,

    #[arg(long, env = "DUE_DB", help = "path of the task database")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

struct App {
    store: Store,
    now: LocalDT,
}

impl App {
    fn list(&self) -> Result<(), AppError> {
        for (i, task) in self.store.pending()?.iter().enumerate() {
            println!("{}", task.display(i + 1, self.now));
        }
        Ok(())
    }

    fn add(&self, words: &[String]) -> Result<(), AppError> {
        let content = parse_input(&words.join(" "), &self.now)?;
        let task = Task::new(content, self.now);
        self.store.insert(&task)?;

        println!("added task <{}>", task.id.to_string().cyan());
        Ok(())
    }

    fn edit(&self, number: &str) -> Result<(), AppError> {
        let task = self.store.find_pending(parse_number(number)?)?;

        let input: String = Input::new()
            .with_prompt("edit")
            .with_initial_text(task.edit_line(self.now))
            .interact_text()?;

        let content = parse_input(&input, &self.now)?;
        self.store.update_content(task.id, &content, self.now)?;

        println!("edited task <{}>", task.id.to_string().cyan());
        Ok(())
    }

    fn complete(&self, number: &str) -> Result<(), AppError> {
        let number = parse_number(number)?;
        let task = self.store.find_pending(number)?;
        if task.completed.is_some() {
            return Err(AppError::AlreadyCompleted(number));
        }

        self.store.complete(task.id, self.now)?;

        println!("marked as completed <{}>", task.id.to_string().cyan());
        Ok(())
    }

    fn archive(&self) -> Result<(), AppError> {
        let count = self.store.archive_completed(self.now)?;
        println!("{} tasks archived", count.to_string().cyan());
        Ok(())
    }
}

fn parse_number(repr: &str) -> Result<usize, AppError> {
    repr.trim()
        .parse()
        .map_err(|_| AppError::InvalidTaskNumber(repr.to_owned()))
}

fn database_path() -> Result<PathBuf, AppError> {
    let mut path = match std::env::var("XDG_DATA_HOME") {
        Ok(v) if !v.is_empty() => PathBuf::from(v),
        Ok(_) | Err(std::env::VarError::NotPresent) => std::env::home_dir()
            .map(|mut x| {
                x.push(".local");
                x.push("share");
                x
            })
            .ok_or_else(|| AppError::DataDir("could not determine home directory".into()))?,
        Err(std::env::VarError::NotUnicode(_)) => {
            return Err(AppError::DataDir("XDG_DATA_HOME is not unicode".into()));
        }
    };
    path.push(HOME_DIR);
    path.push(DATABASE_FILE);
    Ok(path)
}

fn open_store(path: Option<PathBuf>) -> Result<Store, AppError> {
    let path = match path {
        Some(path) => path,
        None => database_path()?,
    };

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if dir.is_file() {
            return Err(AppError::DataDir(format!("{} is a file", dir.display())));
        }
        std::fs::create_dir_all(dir)?;
    }

    tracing::debug!(path = %path.display(), "opening database");
    Store::open(path)
}

fn run(args: Args) -> Result<(), AppError> {
    let app = App {
        store: open_store(args.db)?,
        now: chrono::Local::now(),
    };

    match args.action {
        Action::List => app.list(),
        Action::Add { words } => app.add(&words),
        Action::Edit { number } => app.edit(&number),
        Action::Do { number } => app.complete(&number),
        Action::Archive => app.archive(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = run(args) {
        eprintln!("{}", err.to_string().red());
        std::process::exit(1);
    }
}
