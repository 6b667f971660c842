//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Argus CLI.

use owo_colors::OwoColorize;

/// Terminal output for the Argus commands
pub struct Output {
    /// Whether to use ANSI colors and symbols
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Colored output, the default for an interactive terminal
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Plain ASCII markers for `--no-color`, pipes and CI logs
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the Argus banner shown before a scan
    pub fn banner(&self) {
        if self.colored {
            println!(
                r#"
   {}
   {}
   {}
   {}
   {}
"#,
                "    _    ____   ____ _   _ ____  ".bright_cyan().bold(),
                "   / \\  |  _ \\ / ___| | | / ___| ".bright_cyan().bold(),
                "  / _ \\ | |_) | |  _| | | \\___ \\ ".cyan().bold(),
                " / ___ \\|  _ <| |_| | |_| |___) |".blue().bold(),
                "/_/   \\_\\_| \\_\\\\____|\\___/|____/ ".blue().bold(),
            );
            println!(
                "   {} {}\n",
                "Concurrent Reconnaissance".bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!(
                r#"
    _    ____   ____ _   _ ____
   / \  |  _ \ / ___| | | / ___|
  / _ \ | |_) | |  _| | | \___ \
 / ___ \|  _ <| |_| | |_| |___) |
/_/   \_\_| \_\\____|\___/|____/

   Concurrent Reconnaissance v{}
"#,
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning, e.g. a disabled agent or a config notice
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a written file: a starter config from `init` or a scan report
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file `init` left alone, with the reason
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Print a header for a command's output
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a subheader
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
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

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command the user can run next
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print the closing line of a command
    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "🚀".green(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Print one report section and whether a task filled it.
    ///
    /// Titles are report keys such as `Web_Reconnaissance`; underscores are
    /// shown as spaces.
    pub fn section(&self, title: &str, populated: bool) {
        let label = title.replace('_', " ");
        match (self.colored, populated) {
            (true, true) => println!("    {} {}", "●".green(), label),
            (true, false) => println!("    {} {}", "○".dimmed(), label.dimmed()),
            (false, true) => println!("    [x] {}", label),
            (false, false) => println!("    [ ] {}", label),
        }
    }

    /// Print one entry of the scan's error list (`"<Label> Error: <reason>"`)
    pub fn task_error(&self, error: &str) {
        match error.split_once(" Error: ") {
            Some((label, reason)) if self.colored => {
                println!("    {} {} {}", "✗".red(), label.red().bold(), reason.dimmed())
            }
            _ if self.colored => println!("    {} {}", "✗".red(), error.red()),
            _ => println!("    [FAILED] {}", error),
        }
    }

    /// Print a table header row; columns are 18 wide to fit section labels
    pub fn table_header(&self, columns: &[&str]) {
        let header: String = columns
            .iter()
            .map(|c| format!("{:<18}", c))
            .collect::<Vec<_>>()
            .join(" ");
        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", "─".repeat(columns.len() * 19).dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", "-".repeat(columns.len() * 19));
        }
    }

    /// Print a table row aligned with [`Output::table_header`]
    pub fn table_row(&self, values: &[&str]) {
        let row: String = values
            .iter()
            .map(|v| format!("{:<18}", v))
            .collect::<Vec<_>>()
            .join(" ");
        println!("    {}", row);
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_new() {
        assert!(Output::new().colored);
        assert!(Output::default().colored);
        assert!(!Output::no_color().colored);
    }

    #[test]
    fn test_table_header_empty_columns() {
        let output = Output::no_color();
        output.table_header(&["Agent", "Section", "Tools"]);
        output.table_header(&[]);
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.created("file", "path/to/file");
            output.skipped("path", "reason");
            output.header("Test Header");
            output.subheader("Test Subheader");
            output.kv("key", "value");
            output.list_item("item");
            output.hint("hint message");
            output.command("some command");
            output.section("Web_Reconnaissance", true);
            output.section("OSINT_Intelligence", false);
            output.task_error("OSINT Error: dns timeout");
            output.task_error("deadline exceeded");
            output.table_row(&["a", "b"]);
            output.complete("complete message");
            output.newline();
        }
    }
}
