use anyhow::{Result, bail};
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tarefas_client::{Client, TaskBoard, TaskPatch, load_initial_data};
use tarefas_core::{
    FilterCriteria, Priority, SortColumn, SortDirection, Subject, Task, TaskAction, TaskDraft,
    TaskStatus, format_br,
};

use crate::auth::prompt;

#[derive(Debug, Default)]
pub struct ListOptions {
    pub criteria: FilterCriteria,
    pub sort: Option<SortColumn>,
    pub descending: bool,
}

pub fn require_session(client: &Client) -> Result<()> {
    if !client.session.is_authenticated() {
        bail!("Sessão inválida ou expirada. Execute: tarefas auth login");
    }
    Ok(())
}

async fn loaded_board(client: &Client, timezone: &str) -> Result<TaskBoard> {
    let mut board = client.board(timezone);
    board.refresh().await?;
    Ok(board)
}

fn print_table(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("Nenhuma tarefa encontrada.");
        return;
    }
    println!(
        "{:>5}  {:<30}  {:<15}  {:<10}  {:<13}  {}",
        "ID", "Título", "Responsável", "Prioridade", "Status", "Deadline"
    );
    for t in tasks {
        println!(
            "{:>5}  {:<30}  {:<15}  {:<10}  {:<13}  {}",
            t.id,
            truncate(&t.title, 30),
            truncate(&t.owner, 15),
            t.priority.label(),
            t.status.label(),
            format_br(t.deadline)
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn print_task(t: &Task) {
    println!("#{} {}", t.id, t.title);
    println!("  Descrição:   {}", t.description);
    println!("  Responsável: {}", t.owner);
    println!("  Prioridade:  {}", t.priority);
    println!("  Status:      {}", t.status);
    println!("  Deadline:    {}", format_br(t.deadline));
    println!("  Criada em:   {}", t.created_at.format("%d/%m/%Y %H:%M"));
}

pub async fn list(client: &Client, timezone: &str, opts: ListOptions) -> Result<()> {
    let mut board = loaded_board(client, timezone).await?;
    if let Some(column) = opts.sort {
        board.sort_by(column);
        if opts.descending {
            board.sort_by(column);
        }
    }
    board.set_criteria(opts.criteria);

    print_table(board.view());
    let shown = board.view().len();
    let total = board.list().len();
    if shown != total {
        println!("\n{} de {} tarefas", shown, total);
    }
    if let Some(column) = board.list().sort_state().column {
        let dir = match board.list().sort_state().direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        println!("Ordenado por {} ({})", column, dir);
    }
    Ok(())
}

pub async fn show(client: &Client, id: u64) -> Result<()> {
    let task = client.tasks.get_task(id).await?;
    print_task(&task);
    Ok(())
}

pub async fn create(client: &Client, timezone: &str, draft: TaskDraft) -> Result<()> {
    let mut board = client.board(timezone);
    let task = board.create(draft).await?;
    println!("Tarefa {} criada.", task.id);
    print_task(&task);
    Ok(())
}

pub async fn edit(client: &Client, timezone: &str, id: u64, patch: TaskPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("Nada para alterar: informe ao menos um campo.");
    }
    let mut board = loaded_board(client, timezone).await?;
    let task = board.update(id, patch).await?;
    println!("Tarefa {} atualizada.", task.id);
    print_task(&task);
    Ok(())
}

pub async fn complete(client: &Client, timezone: &str, id: u64) -> Result<()> {
    let mut board = loaded_board(client, timezone).await?;
    let task = board.complete(id).await?;
    println!("Tarefa {} concluída.", task.id);
    Ok(())
}

pub async fn delete(client: &Client, timezone: &str, id: u64, yes: bool) -> Result<()> {
    let mut board = loaded_board(client, timezone).await?;
    if let Some(task) = board.get(id) {
        task.ensure_mutable(TaskAction::Delete)?;
        if !yes {
            let answer = prompt(&format!("Excluir a tarefa \"{}\"? [s/N]", task.title))?;
            if !matches!(answer.to_lowercase().as_str(), "s" | "sim" | "y" | "yes") {
                println!("Cancelado.");
                return Ok(());
            }
        }
    }
    board.delete(id).await?;
    println!("Tarefa {} excluída.", id);
    Ok(())
}

/// Owners, statuses and priorities for the task forms, loaded together.
pub async fn options(client: &Client) -> Result<()> {
    let loading = Subject::new(false);
    let announced = Arc::new(AtomicBool::new(false));
    let flag = announced.clone();
    let _sub = loading.subscribe(move |busy| {
        if *busy && !flag.swap(true, Ordering::SeqCst) {
            eprintln!("Carregando...");
        }
    });

    let data = load_initial_data(&client.tasks, &loading).await;

    if let Ok(owners) = &data.owners {
        println!("Responsáveis: {}", owners.join(", "));
    }
    if let Ok(statuses) = &data.statuses {
        let labels: Vec<&str> = statuses.iter().map(|s| s.label()).collect();
        println!("Status:       {}", labels.join(", "));
    }
    if let Ok(priorities) = &data.priorities {
        let labels: Vec<&str> = priorities.iter().map(|p| p.label()).collect();
        println!("Prioridades:  {}", labels.join(", "));
    }
    if let Ok(tasks) = &data.tasks {
        println!("Tarefas:      {}", tasks.len());
    }
    for err in data.failures() {
        eprintln!("aviso: {}", err);
    }
    Ok(())
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    tarefas_core::parse_deadline(s).map_err(|e| e.to_string())
}

pub fn draft(
    title: String,
    description: String,
    owner: String,
    priority: Option<Priority>,
    deadline: Option<NaiveDate>,
) -> TaskDraft {
    TaskDraft {
        title,
        description,
        owner,
        priority,
        deadline,
        status: Some(TaskStatus::Pending),
    }
}
