use anyhow::Result;
use chrono::DateTime;
use std::io::{self, Write};
use tarefas_client::{Client, CreateUserRequest, LoginRequest};
use tarefas_core::{RegistrationForm, validate_login, validate_registration};

pub fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Plain stdin; the terminal still echoes.
pub fn prompt_secret(label: &str) -> Result<String> {
    prompt(label)
}

fn or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}

pub async fn login(client: &Client, username: Option<String>) -> Result<()> {
    let username = or_prompt(username, "Username")?;
    let senha = prompt_secret("Senha")?;
    validate_login(&username, &senha)?;

    let session = client.session.login(&LoginRequest { username, senha }).await?;
    println!("Bem-vindo, {}!", session.username);
    Ok(())
}

pub fn logout(client: &Client) {
    client.session.logout();
    println!("Sessão encerrada.");
}

pub fn status(client: &Client) {
    match client.session.current_session() {
        Some(s) => {
            let expires = DateTime::from_timestamp_millis(s.expires_at_ms)
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| s.expires_at_ms.to_string());
            println!("Autenticado como {} (expira em {})", s.username, expires);
        }
        None => println!("Não autenticado. Execute: tarefas auth login"),
    }
}

pub async fn register(
    client: &Client,
    name: Option<String>,
    email: Option<String>,
    username: Option<String>,
) -> Result<()> {
    let form = RegistrationForm {
        full_name: or_prompt(name, "Nome completo")?,
        email: or_prompt(email, "Email")?,
        username: or_prompt(username, "Username")?,
        password: prompt_secret("Senha")?,
        confirm_password: prompt_secret("Confirme a senha")?,
    };
    validate_registration(&form)?;

    let user = client
        .users
        .create(&CreateUserRequest {
            nome: form.full_name,
            email: form.email,
            username: form.username,
            senha: form.password,
        })
        .await?;
    println!("Usuário {} criado. Faça login com: tarefas auth login", user.username);
    Ok(())
}
