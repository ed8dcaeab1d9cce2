//! services/task_service.rs
//! Registro en memoria de tareas en background (task_id -> estado), con un
//! candado de exclusión por tipo: a lo sumo una campaña activa por canal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::Utc;
use uuid::Uuid;

use crate::models::task_model::{TaskRecord, TaskStatus};

#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<Mutex<HashMap<String, TaskRecord>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        TaskRegistry {
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Crea una tarea en estado queued y devuelve su id. Con `exclusive`,
    /// si ya existe una tarea no terminal del mismo tipo la creación se
    /// rechaza: dos campañas simultáneas del mismo canal compartirían la
    /// ventana de uso y podrían exceder los límites de sus senders.
    pub fn create(&self, task_type: &str, exclusive: bool) -> Result<String> {
        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");

        if exclusive {
            let already_active = tasks
                .values()
                .any(|t| t.task_type == task_type && !t.status.is_terminal());
            if already_active {
                return Err(anyhow!("A '{}' task is already running.", task_type));
            }
        }

        let task_id = Uuid::new_v4().to_string();
        tasks.insert(
            task_id.clone(),
            TaskRecord {
                id: task_id.clone(),
                task_type: task_type.to_string(),
                status: TaskStatus::Queued,
                progress: "Waiting to start...".to_string(),
                error: None,
                started_at: Utc::now(),
                finished_at: None,
            },
        );
        Ok(task_id)
    }

    pub fn mark_running(&self, task_id: &str) {
        self.update(task_id, |t| {
            t.status = TaskStatus::Running;
            t.progress = "Starting...".to_string();
        });
    }

    pub fn update_progress(&self, task_id: &str, progress: &str) {
        self.update(task_id, |t| t.progress = progress.to_string());
    }

    pub fn mark_completed(&self, task_id: &str, progress: &str) {
        self.update(task_id, |t| {
            t.status = TaskStatus::Completed;
            t.progress = progress.to_string();
            t.finished_at = Some(Utc::now());
        });
    }

    pub fn mark_failed(&self, task_id: &str, error: &str) {
        self.update(task_id, |t| {
            t.status = TaskStatus::Failed;
            t.error = Some(error.to_string());
            t.finished_at = Some(Utc::now());
        });
    }

    /// Copia del estado actual de la tarea, si existe.
    pub fn get(&self, task_id: &str) -> Option<TaskRecord> {
        self.tasks
            .lock()
            .expect("task registry lock poisoned")
            .get(task_id)
            .cloned()
    }

    fn update<F: FnOnce(&mut TaskRecord)>(&self, task_id: &str, f: F) {
        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");
        match tasks.get_mut(task_id) {
            Some(task) => f(task),
            None => log::error!("Se intentó actualizar una tarea inexistente: {}", task_id),
        }
    }
}
