//! Colored output helpers for CLI

use owo_colors::OwoColorize;
use pdfrag::types::Source;
use pdfrag::IngestReport;

/// Longest slice of a source chunk printed under an answer.
const SNIPPET_CHARS: usize = 160;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the startup banner
    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "pdfrag".bright_cyan().bold(),
                version.dimmed(),
                "Ask questions about your PDFs".bright_white()
            );
        } else {
            println!("\n   pdfrag {}\n   Ask questions about your PDFs\n", version);
        }
    }

    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Summary line for an indexed PDF
    pub fn ingested(&self, report: &IngestReport) {
        self.success(&format!(
            "{} ({} pages, {} chunks)",
            report.filename, report.doc_len, report.chunks
        ));
    }

    /// Print a model answer followed by the chunks it was given
    pub fn answer(&self, answer: &str, sources: &[Source]) {
        if self.colored {
            println!("\n  {}\n", answer.bright_white());
        } else {
            println!("\n  {}\n", answer);
        }

        if sources.is_empty() {
            self.hint("No indexed passages matched this question.");
            return;
        }

        self.header("Sources");
        for (i, source) in sources.iter().enumerate() {
            let location = format!("{} (page {})", source.source, source.page);
            let snippet = snippet(&source.page_content);
            if self.colored {
                println!("    {} {}", format!("[{}]", i + 1).dimmed(), location.cyan());
                println!("        {}", snippet.dimmed());
            } else {
                println!("    [{}] {}", i + 1, location);
                println!("        {}", snippet);
            }
        }
    }

    pub fn newline(&self) {
        println!();
    }
}

/// First line of a chunk, cut to [`SNIPPET_CHARS`] characters.
fn snippet(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= SNIPPET_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(SNIPPET_CHARS).collect();
    format!("{}…", cut)
}
