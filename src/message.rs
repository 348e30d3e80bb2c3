use colored::Colorize;

pub fn greeting(lines: &[&str]) {
    println!();
    for line in lines {
        println!("{}", line.green().bold());
    }
    println!();
}

pub fn info(text: &str) {
    println!("{}", text.cyan());
}

pub fn warning(text: &str) {
    println!("{}", format!("WARNING: {}", text).yellow());
}

pub fn error(lines: &[&str]) {
    for line in lines {
        eprintln!("{}", format!("ERROR: {}", line).red().bold());
    }
}
