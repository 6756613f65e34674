use serde_json::Value;

/// Human-readable probe output. Lines are echoed to stdout as they are
/// produced (when enabled) and kept for inspection.
#[derive(Debug, Default)]
pub struct Report {
    echo: bool,
    lines: Vec<String>,
}

impl Report {
    pub fn stdout() -> Self {
        Self {
            echo: true,
            lines: Vec::new(),
        }
    }

    /// Collects lines without printing them.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if self.echo {
            println!("{}", line);
        }
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.line("");
    }

    pub fn rule(&mut self, width: usize) {
        self.line("=".repeat(width));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

pub fn mark(ok: bool) -> &'static str {
    if ok {
        "✅"
    } else {
        "❌"
    }
}

/// Renders a body field for display without caring about its type.
pub fn show(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "n/a".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
