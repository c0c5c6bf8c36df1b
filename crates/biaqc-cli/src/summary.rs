use std::path::Path;

use biaqc_core::metadata::{ConsistencyReport, Status};
use console::Style;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    path: Style,
    pass: Style,
    fail: Style,
    info: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            path: Style::new().underlined(),
            pass: Style::new().green(),
            fail: Style::new().red().bold(),
            info: Style::new().yellow(),
        }
    }

    fn status(&self, status: Status) -> &Style {
        match status {
            Status::Pass => &self.pass,
            Status::Fail => &self.fail,
            Status::Info => &self.info,
        }
    }
}

pub fn print_run_header(title: &str, input: &Path, files: usize, output: &Path) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(input.display())
    );
    println!("  {:<14}{}", s.label.apply_to("Files"), s.value.apply_to(files));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.display())
    );
    println!();
}

pub fn print_report(report: &ConsistencyReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Metadata consistency"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(20)));
    println!();
    for line in &report.lines {
        println!(
            "  {} {}",
            s.status(line.status).apply_to(line.status.marker()),
            line.text
        );
    }
    println!();
}
