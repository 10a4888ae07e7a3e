//! URL layout of the Tarefas API.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    auth_login: String,
    usuarios: String,
    tarefas: String,
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/').trim_end_matches('/')
    )
}

impl Endpoints {
    /// `base_url` plus the three resource prefixes, e.g.
    /// `("http://localhost:8080", "/auth/login", "/api/usuarios", "/api/tarefas")`.
    pub fn new(base_url: &str, auth_login: &str, usuarios: &str, tarefas: &str) -> Self {
        Self {
            auth_login: join(base_url, auth_login),
            usuarios: join(base_url, usuarios),
            tarefas: join(base_url, tarefas),
        }
    }

    pub fn login(&self) -> &str {
        &self.auth_login
    }

    pub fn create_user(&self) -> String {
        format!("{}/criar", self.usuarios)
    }

    pub fn list_users(&self) -> String {
        format!("{}/listar", self.usuarios)
    }

    pub fn priorities(&self) -> String {
        format!("{}/prioridades", self.tarefas)
    }

    pub fn statuses(&self) -> String {
        format!("{}/status", self.tarefas)
    }

    pub fn list_tasks(&self) -> String {
        format!("{}/listar", self.tarefas)
    }

    pub fn create_task(&self) -> String {
        format!("{}/criar", self.tarefas)
    }

    pub fn task(&self, id: u64) -> String {
        format!("{}/{}", self.tarefas, id)
    }

    /// Calls that must work without a session: login and registration.
    pub fn is_public(&self, url: &str) -> bool {
        url.starts_with(&self.auth_login) || url.starts_with(&self.create_user())
    }
}
