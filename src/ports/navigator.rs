use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Route {
    StudentDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::StudentDashboard => "/student-dashboard",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
