use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Сырой лог запросов к API маркетплейса (по файлу на маркетплейс)
#[derive(Debug, Clone)]
pub struct ApiRequestLog {
    path: Option<PathBuf>,
}

impl ApiRequestLog {
    pub fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            path: Some(dir.join(file_name)),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Лог в каталоге `dir`; без каталога запись отключена
    pub fn in_dir(dir: Option<&Path>, file_name: &str) -> Self {
        match dir {
            Some(dir) => Self::new(dir, file_name),
            None => Self::disabled(),
        }
    }

    /// Записать в лог-файл
    pub fn write(&self, message: &str) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] {}", timestamp, message);
        }
    }
}

/// Первые 500 символов тела ответа для логов и сообщений об ошибках
pub fn body_preview(body: &str) -> String {
    let preview: String = body.chars().take(500).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}
