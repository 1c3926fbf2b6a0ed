use chrono::{Local, NaiveDate};
use std::io::{self, Write};
use task_scheduler::schedule::{self, Completion};
use task_scheduler::{AppConfig, SqliteTaskStore, Task, TaskStore, dates, recurrence};
use tracing_subscriber::EnvFilter;

const COLUMNS: [&str; 5] = ["id", "date", "title", "comment", "repeat"];

fn task_cells(task: &Task) -> [&str; 5] {
    [
        task.id.as_str(),
        task.date.as_str(),
        task.title.as_str(),
        task.comment.as_str(),
        task.repeat.as_str(),
    ]
}

fn render_tasks_as_text_table(tasks: &[Task]) -> String {
    // Compute column widths
    let mut widths: Vec<usize> = COLUMNS.iter().map(|n| n.len()).collect();
    for task in tasks {
        for (ci, cell) in task_cells(task).iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    // Build horizontal separator
    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[&str]| {
        let mut row = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            row.push(' ');
            row.push_str(cell);
            row.push_str(&" ".repeat(widths[ci].saturating_sub(cell.chars().count())));
            row.push_str(" |");
        }
        row
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&COLUMNS));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for task in tasks {
        out.push_str(&render_row(&task_cells(task)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  next <now> <date> <rule...>        Next occurrence of <rule> anchored at <date> after <now> (YYYYMMDD, - for today)\n  check <rule...>                    Validate a repeat rule\n  add <date|-> <title> [rule...]     Add a task ('-' for today)\n  list                               Show upcoming tasks\n  done <id>                          Complete a task (one-shot tasks are removed)\n  delete <id>                        Delete a task\n  quit|exit                          Exit\n\nRules: d <1-400> | y | w <1-7,...> | m <days> [<months>]"
    );
}

fn parse_id(raw: Option<&str>, usage: &str) -> Option<i64> {
    match raw.map(str::parse::<i64>) {
        Some(Ok(id)) => Some(id),
        Some(Err(_)) => {
            println!("Invalid id");
            None
        }
        None => {
            println!("Usage: {usage}");
            None
        }
    }
}

fn run_next(today: NaiveDate, args: &[&str]) {
    let [now, date, rule @ ..] = args else {
        println!("Usage: next <now> <date> <rule...>");
        return;
    };
    let now = if *now == "-" {
        today
    } else {
        match dates::parse_date(now) {
            Ok(now) => now,
            Err(e) => {
                println!("Error: {e}");
                return;
            }
        }
    };
    match schedule::next_date(now, date, &rule.join(" ")) {
        Ok(next) => println!("Next date: {next}"),
        Err(e) => println!("Error: {e}"),
    }
}

fn run_add(store: &dyn TaskStore, today: NaiveDate, args: &[&str]) {
    let [date, title, rule @ ..] = args else {
        println!("Usage: add <date|-> <title> [rule...]");
        return;
    };
    let date = if *date == "-" { "" } else { *date };
    let task = Task::new(*title)
        .with_date(date)
        .with_repeat(rule.join(" "));
    match schedule::add_task(store, task, today) {
        Ok(id) => match store.get_task(id) {
            Ok(Some(task)) => println!("Added task {id} on {}.", task.date),
            Ok(None) => println!("Added task {id}."),
            Err(e) => println!("Error reading task: {e}"),
        },
        Err(e) => println!("Error adding task: {e}"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env()?;
    let store = SqliteTaskStore::new(&config.db_file)?;

    println!("Task Scheduler (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let today = Local::now().date_naive();
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "next" => run_next(today, &args),
            "check" => match recurrence::parse(&args.join(" ")) {
                Ok(rule) => println!("Rule OK: {rule}"),
                Err(e) => println!("Invalid rule: {e}"),
            },
            "add" => run_add(&store, today, &args),
            "list" => match store.list_tasks(config.task_limit) {
                Ok(tasks) => println!("{}", render_tasks_as_text_table(&tasks)),
                Err(e) => println!("Error listing tasks: {e}"),
            },
            "done" => {
                let Some(id) = parse_id(args.first().copied(), "done <id>") else {
                    continue;
                };
                match schedule::complete_task(&store, id, today) {
                    Ok(Completion::Removed) => println!("Task {id} done and removed."),
                    Ok(Completion::Rescheduled(date)) => println!("Task {id} moved to {date}."),
                    Err(e) => println!("Error completing task: {e}"),
                }
            }
            "delete" => {
                let Some(id) = parse_id(args.first().copied(), "delete <id>") else {
                    continue;
                };
                match schedule::delete_task(&store, id) {
                    Ok(()) => println!("Deleted task {id}."),
                    Err(e) => println!("Error deleting task: {e}"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}
