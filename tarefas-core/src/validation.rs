//! Form validation for login, registration and task forms.
//!
//! Messages are user-facing (Portuguese) and reported per field, first
//! failing rule only, in field order.

use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::task::{Priority, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msgs: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&msgs.join(" "))
    }
}

impl std::error::Error for ValidationErrors {}

pub type ValidationResult = Result<(), ValidationErrors>;

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn failed(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn push(&mut self, field: &'static str, message: String) {
        if !self.failed(field) {
            self.errors.push(FieldError { field, message });
        }
    }

    fn required(&mut self, field: &'static str, label: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, format!("{label} é obrigatório."));
        }
        self
    }

    fn present<T>(&mut self, field: &'static str, label: &str, value: Option<T>) -> &mut Self {
        if value.is_none() {
            self.push(field, format!("{label} é obrigatório."));
        }
        self
    }

    fn min_len(&mut self, field: &'static str, label: &str, value: &str, min: usize) -> &mut Self {
        if !value.trim().is_empty() && value.chars().count() < min {
            self.push(field, format!("{label} deve ter pelo menos {min} caracteres."));
        }
        self
    }

    fn max_len(&mut self, field: &'static str, label: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.push(field, format!("{label} deve ter no máximo {max} caracteres."));
        }
        self
    }

    fn not_past(&mut self, field: &'static str, value: Option<NaiveDate>, today: NaiveDate) -> &mut Self {
        if value.is_some_and(|d| d < today) {
            self.push(
                field,
                "Deadline não pode ser uma data anterior ao dia atual.".to_string(),
            );
        }
        self
    }

    fn finish(&mut self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*$")
            .expect("email regex is valid")
    })
}

pub fn validate_login(username: &str, senha: &str) -> ValidationResult {
    Checker::default()
        .required("username", "Username", username)
        .min_len("username", "Username", username, 3)
        .required("senha", "Senha", senha)
        .min_len("senha", "Senha", senha, 3)
        .finish()
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

pub fn validate_registration(form: &RegistrationForm) -> ValidationResult {
    let mut c = Checker::default();
    c.required("full_name", "Nome", &form.full_name)
        .min_len("full_name", "Nome", &form.full_name, 2)
        .required("email", "Email", &form.email);
    if !form.email.trim().is_empty() && !email_re().is_match(form.email.trim()) {
        c.push("email", "Email inválido.".to_string());
    }
    c.required("username", "Username", &form.username)
        .min_len("username", "Username", &form.username, 3)
        .required("password", "Senha", &form.password)
        .min_len("password", "Senha", &form.password, 6)
        .required("confirm_password", "Confirmação de senha", &form.confirm_password);
    if form.password != form.confirm_password {
        c.push("confirm_password", "As senhas não coincidem.".to_string());
    }
    c.finish()
}

/// Field values of the task create/edit forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub owner: String,
    pub priority: Option<Priority>,
    pub deadline: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

pub fn validate_new_task(draft: &TaskDraft, today: NaiveDate) -> ValidationResult {
    Checker::default()
        .required("title", "Título", &draft.title)
        .min_len("title", "Título", &draft.title, 3)
        .required("description", "Descrição", &draft.description)
        .min_len("description", "Descrição", &draft.description, 5)
        .max_len("description", "Descrição", &draft.description, 500)
        .required("owner", "Responsável", &draft.owner)
        .present("priority", "Prioridade", draft.priority)
        .present("deadline", "Deadline", draft.deadline)
        .not_past("deadline", draft.deadline, today)
        .finish()
}

pub fn validate_task_edit(draft: &TaskDraft, today: NaiveDate) -> ValidationResult {
    Checker::default()
        .required("title", "Título", &draft.title)
        .min_len("title", "Título", &draft.title, 3)
        .required("description", "Descrição", &draft.description)
        .min_len("description", "Descrição", &draft.description, 10)
        .required("owner", "Responsável", &draft.owner)
        .min_len("owner", "Responsável", &draft.owner, 3)
        .present("priority", "Prioridade", draft.priority)
        .present("deadline", "Deadline", draft.deadline)
        .not_past("deadline", draft.deadline, today)
        .present("status", "Status", draft.status)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn draft() -> TaskDraft {
        TaskDraft {
            title: "Revisar PR".into(),
            description: "Revisar o PR do módulo de sessão".into(),
            owner: "alice".into(),
            priority: Some(Priority::High),
            deadline: Some(today()),
            status: Some(TaskStatus::Pending),
        }
    }

    #[test]
    fn login_requires_three_chars() {
        assert!(validate_login("bob", "123").is_ok());
        let err = validate_login("bo", "").unwrap_err();
        assert_eq!(err.for_field("username"), Some("Username deve ter pelo menos 3 caracteres."));
        assert_eq!(err.for_field("senha"), Some("Senha é obrigatório."));
    }

    #[test]
    fn registration_checks_email_and_password_match() {
        let mut form = RegistrationForm {
            full_name: "Alice".into(),
            email: "alice@example.com".into(),
            username: "alice".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        };
        assert!(validate_registration(&form).is_ok());

        form.email = "alice-at-example".into();
        form.confirm_password = "secret2".into();
        let err = validate_registration(&form).unwrap_err();
        assert_eq!(err.for_field("email"), Some("Email inválido."));
        assert_eq!(err.for_field("confirm_password"), Some("As senhas não coincidem."));
    }

    #[test]
    fn new_task_rejects_past_deadline() {
        assert!(validate_new_task(&draft(), today()).is_ok());

        let mut d = draft();
        d.deadline = today().pred_opt();
        let err = validate_new_task(&d, today()).unwrap_err();
        assert_eq!(
            err.for_field("deadline"),
            Some("Deadline não pode ser uma data anterior ao dia atual.")
        );
    }

    #[test]
    fn new_task_length_limits() {
        let mut d = draft();
        d.title = "ab".into();
        d.description = "x".repeat(501);
        d.priority = None;
        let err = validate_new_task(&d, today()).unwrap_err();
        assert_eq!(err.for_field("title"), Some("Título deve ter pelo menos 3 caracteres."));
        assert_eq!(err.for_field("description"), Some("Descrição deve ter no máximo 500 caracteres."));
        assert_eq!(err.for_field("priority"), Some("Prioridade é obrigatório."));
        assert_eq!(err.0.len(), 3);
    }

    #[test]
    fn edit_is_stricter_on_description_and_owner() {
        let mut d = draft();
        d.description = "curta".into();
        d.owner = "al".into();
        assert!(validate_new_task(&d, today()).is_ok());
        let err = validate_task_edit(&d, today()).unwrap_err();
        assert_eq!(err.for_field("description"), Some("Descrição deve ter pelo menos 10 caracteres."));
        assert_eq!(err.for_field("owner"), Some("Responsável deve ter pelo menos 3 caracteres."));
    }
}
