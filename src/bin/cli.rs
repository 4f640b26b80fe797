use chrono::{Datelike, Local, NaiveDate};
use std::collections::HashMap;
use std::io::{self, Write};
use task_calendar::{
    CalendarAssembler, CalendarConfig, DragIntent, DropTarget, InMemoryTaskStore, MonthView,
    NewTask, Task, TaskPatch, TaskStore, YearMonth, filter_tasks, grid::WEEKDAY_LABELS,
    load_tasks_from_csv, load_tasks_from_json, save_tasks_to_csv, save_tasks_to_json, telemetry,
};

type Positions = HashMap<String, usize>;

struct Session {
    store: InMemoryTaskStore,
    assembler: CalendarAssembler,
    month: YearMonth,
}

impl Session {
    fn new(config: &CalendarConfig) -> Self {
        let today = Local::now().date_naive();
        let assembler = CalendarAssembler::from_config(config);
        assembler
            .holidays()
            .prefetch(config.prefetch_range(today.year()));
        Self {
            store: InMemoryTaskStore::new(),
            assembler,
            month: YearMonth::from_date(today),
        }
    }

    /// Every task, numbered the way `list` and `show` print them.
    fn numbered(&self) -> Vec<Task> {
        let mut tasks = self.store.as_slice().to_vec();
        tasks.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(a.order.cmp(&b.order))
                .then_with(|| a.id.cmp(&b.id))
        });
        tasks
    }

    /// Resolve `#n`/`n` list positions or a raw task id.
    fn resolve(&self, reference: &str) -> Option<Task> {
        let tasks = self.numbered();
        let position = reference.trim_start_matches('#').parse::<usize>().ok();
        if let Some(position) = position {
            if (1..=tasks.len()).contains(&position) {
                return tasks.into_iter().nth(position - 1);
            }
        }
        tasks.into_iter().find(|task| task.id == reference)
    }

    fn positions(&self) -> Positions {
        positions_of(&self.numbered())
    }

    fn view(&self) -> MonthView {
        self.assembler
            .month_view(self.month, self.store.as_slice(), Local::now().date_naive())
    }
}

/// List number of every task id in an already numbered listing.
fn positions_of(numbered: &[Task]) -> Positions {
    numbered
        .iter()
        .zip(1..)
        .map(|(task, position)| (task.id.clone(), position))
        .collect()
}

fn render_month(view: &MonthView, session: &Session) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:^42}\n", view.title));
    for label in WEEKDAY_LABELS {
        out.push_str(&format!("{label:>6}"));
    }
    out.push('\n');

    for week in view.weeks() {
        for cell in week {
            let mut label = if cell.is_current_month {
                cell.date.day().to_string()
            } else {
                format!("({})", cell.date.day())
            };
            if cell.is_today {
                label.push('*');
            }
            if !cell.tasks.is_empty() || !cell.holidays.is_empty() {
                label.push('+');
            }
            out.push_str(&format!("{label:>6}"));
        }
        out.push('\n');
    }

    let positions = session.positions();
    let mut agenda = Vec::new();
    for cell in view.cells.iter().filter(|cell| cell.is_current_month) {
        for holiday in &cell.holidays {
            agenda.push(format!(
                "  {}  {} [{}]",
                cell.date,
                holiday.name,
                holiday.kind.as_str()
            ));
        }
        for task in &cell.tasks {
            agenda.push(format!("  {}  {}", cell.date, format_task(task, &positions)));
        }
    }
    if !agenda.is_empty() {
        out.push('\n');
        out.push_str(&agenda.join("\n"));
        out.push('\n');
    }
    out
}

fn format_task(task: &Task, positions: &Positions) -> String {
    let check = if task.completed { "x" } else { " " };
    let mut line = format!(
        "#{} [{}] {} (order {})",
        positions.get(&task.id).copied().unwrap_or(0),
        check,
        task.title,
        task.order
    );
    if let Some(description) = &task.description {
        line.push_str(&format!(" - {description}"));
    }
    line
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the current month\n  next | prev                        Navigate one month\n  today                              Jump to the current month\n  goto <YYYY-MM>                     Jump to a month\n  list                               List all tasks with their numbers\n  find <query...>                    List tasks whose title or description matches\n  add <YYYY-MM-DD> <title...>        Append a task to a day\n  desc <task> <text...>              Set a task description (empty clears)\n  title <task> <text...>             Rename a task\n  done <task>                        Toggle completion\n  delete <task>                      Delete a task\n  move <task> <YYYY-MM-DD> [order]   Drop a task on a day, optionally onto a row\n  drop <json> <YYYY-MM-DD> [order]   Drop using a raw drag payload\n  holidays [YYYY|YYYY-MM]            List holidays\n  save <json|csv> <path>             Save tasks to disk\n  load <json|csv> <path>             Load tasks from disk\n  config <path>                      Load calendar config (TOML or JSON)\n  quit|exit                          Exit\n\n<task> is a number from `list` or a task id."
    );
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

fn parse_target(date_s: Option<&str>, order_s: Option<&str>) -> Result<DropTarget, String> {
    let date = date_s
        .and_then(parse_date)
        .ok_or_else(|| "Invalid date (YYYY-MM-DD)".to_string())?;
    match order_s {
        None => Ok(DropTarget::end_of_day(date)),
        Some(order_s) => order_s
            .parse::<u32>()
            .map(|order| DropTarget::onto(date, order))
            .map_err(|_| "Invalid order".to_string()),
    }
}

fn perform_drop(session: &mut Session, intent: &DragIntent, target: &DropTarget) {
    match session.store.drop_task(intent, target) {
        Ok(plan) if plan.is_noop() => println!("Task already in place."),
        Ok(plan) => {
            println!("Moved task ({} updates).", plan.deltas.len());
            println!("{}", render_month(&session.view(), session));
        }
        Err(e) => println!("Drop rejected: {}", e),
    }
}

fn rest_of_line(input: &str, skip: usize) -> &str {
    let mut rest = input.trim_start();
    for _ in 0..skip {
        rest = rest
            .split_once(char::is_whitespace)
            .map(|(_, tail)| tail.trim_start())
            .unwrap_or("");
    }
    rest.trim()
}

fn main() {
    telemetry::init_tracing("warn");

    let config = match CalendarConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}; using defaults");
            CalendarConfig::default()
        }
    };
    let mut session = Session::new(&config);

    println!("Task Calendar (CLI) - type 'help' for commands\n");
    println!("{}", render_month(&session.view(), &session));

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

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_month(&session.view(), &session)),
            "next" | "prev" => {
                let moved = if cmd == "next" {
                    session.month.succ()
                } else {
                    session.month.pred()
                };
                match moved {
                    Ok(month) => {
                        session.month = month;
                        println!("{}", render_month(&session.view(), &session));
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "today" => {
                session.month = YearMonth::from_date(Local::now().date_naive());
                println!("{}", render_month(&session.view(), &session));
            }
            "goto" => match parts.next().map(str::parse::<YearMonth>) {
                Some(Ok(month)) => {
                    session.month = month;
                    println!("{}", render_month(&session.view(), &session));
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: goto <YYYY-MM>"),
            },
            "list" => {
                let tasks = session.numbered();
                let positions = positions_of(&tasks);
                if tasks.is_empty() {
                    println!("No tasks.");
                }
                for task in &tasks {
                    println!("  {}  {}", task.date, format_task(task, &positions));
                }
            }
            "find" => {
                let query = rest_of_line(input, 1);
                let tasks = session.numbered();
                let positions = positions_of(&tasks);
                let matches = filter_tasks(&tasks, query);
                if matches.is_empty() {
                    println!("No tasks match '{}'.", query);
                }
                for task in matches {
                    println!("  {}  {}", task.date, format_task(task, &positions));
                }
            }
            "add" => {
                let date = parts.next().and_then(parse_date);
                let title = rest_of_line(input, 2);
                match date {
                    Some(date) if !title.is_empty() => {
                        match session.store.insert_task(NewTask::new(title, date)) {
                            Ok(task) => {
                                println!(
                                    "Added task #{} on {}.",
                                    session.positions().get(&task.id).copied().unwrap_or(0),
                                    task.date
                                );
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: add <YYYY-MM-DD> <title...>"),
                }
            }
            "desc" | "title" => {
                let Some(task) = parts.next().and_then(|r| session.resolve(r)) else {
                    println!("Usage: {} <task> <text...>", cmd);
                    continue;
                };
                let text = rest_of_line(input, 2).to_string();
                let patch = if cmd == "desc" {
                    TaskPatch {
                        description: Some(text),
                        ..TaskPatch::default()
                    }
                } else {
                    TaskPatch {
                        title: Some(text),
                        ..TaskPatch::default()
                    }
                };
                match session.store.update_task(&task.id, &patch) {
                    Ok(updated) => println!("Updated {}", format_task(&updated, &session.positions())),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "done" => match parts.next().and_then(|r| session.resolve(r)) {
                Some(task) => match session.store.toggle_completed(&task.id) {
                    Ok(updated) => println!("Updated {}", format_task(&updated, &session.positions())),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: done <task>"),
            },
            "delete" => match parts.next().and_then(|r| session.resolve(r)) {
                Some(task) => match session.store.remove_task(&task.id) {
                    Ok(removed) => println!("Deleted task '{}'.", removed.title),
                    Err(e) => println!("Error deleting task: {}", e),
                },
                None => println!("Task not found."),
            },
            "move" => {
                let Some(task) = parts.next().and_then(|r| session.resolve(r)) else {
                    println!("Usage: move <task> <YYYY-MM-DD> [order]");
                    continue;
                };
                let target = match parse_target(parts.next(), parts.next()) {
                    Ok(target) => target,
                    Err(message) => {
                        println!("{}", message);
                        continue;
                    }
                };
                let day_index = session
                    .store
                    .tasks_on(task.date)
                    .map(|day| day.iter().position(|t| t.id == task.id).unwrap_or(0))
                    .unwrap_or(0);
                let intent = DragIntent::for_task(&task, day_index);
                perform_drop(&mut session, &intent, &target);
            }
            "drop" => {
                let (Some(payload), date_s, order_s) = (parts.next(), parts.next(), parts.next())
                else {
                    println!("Usage: drop <json> <YYYY-MM-DD> [order]");
                    continue;
                };
                let intent = match DragIntent::from_json(payload) {
                    Ok(intent) => intent,
                    Err(e) => {
                        println!("Drop rejected: {}", e);
                        continue;
                    }
                };
                match parse_target(date_s, order_s) {
                    Ok(target) => perform_drop(&mut session, &intent, &target),
                    Err(message) => println!("{}", message),
                }
            }
            "holidays" => {
                let holidays = match parts.next() {
                    None => session.assembler.holidays().holidays_for_month(session.month),
                    Some(arg) if arg.contains('-') => match arg.parse::<YearMonth>() {
                        Ok(month) => session.assembler.holidays().holidays_for_month(month),
                        Err(e) => {
                            println!("Error: {}", e);
                            continue;
                        }
                    },
                    Some(arg) => match arg.parse::<i32>() {
                        Ok(year) => session.assembler.holidays().holidays_for_year(year).to_vec(),
                        Err(_) => {
                            println!("Usage: holidays [YYYY|YYYY-MM]");
                            continue;
                        }
                    },
                };
                if holidays.is_empty() {
                    println!("No holidays.");
                }
                for holiday in holidays {
                    println!("  {}  {} [{}]", holiday.date, holiday.name, holiday.kind.as_str());
                }
            }
            "save" => match (parts.next(), parts.next()) {
                (Some(fmt), Some(path)) => {
                    let result = match fmt {
                        "json" => save_tasks_to_json(session.store.as_slice(), path),
                        "csv" => save_tasks_to_csv(session.store.as_slice(), path),
                        _ => {
                            println!("Unknown format '{}'", fmt);
                            continue;
                        }
                    };
                    match result {
                        Ok(()) => println!("Tasks saved to {}", path),
                        Err(e) => println!("Error saving tasks: {}", e),
                    }
                }
                _ => println!("Usage: save <json|csv> <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some(fmt), Some(path)) => {
                    let loaded = match fmt {
                        "json" => load_tasks_from_json(path),
                        "csv" => load_tasks_from_csv(path),
                        _ => {
                            println!("Unknown format '{}'", fmt);
                            continue;
                        }
                    };
                    match loaded.and_then(|tasks| session.store.replace(tasks)) {
                        Ok(()) => println!("Tasks loaded from {}", path),
                        Err(e) => println!("Error loading tasks: {}", e),
                    }
                }
                _ => println!("Usage: load <json|csv> <path>"),
            },
            "config" => match parts.next() {
                Some(path) => match CalendarConfig::load(path) {
                    Ok(config) => {
                        session.assembler = CalendarAssembler::from_config(&config);
                        println!("Config loaded from {}", path);
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: config <path>"),
            },
            _ => println!("Unknown command '{}'. Type 'help'.", cmd),
        }
    }
}
