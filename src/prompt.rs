//! Interactive confirmation gate before the output file is written.

use std::io::BufRead;

/// Read one answer line from `input`; only a case-insensitive `y` confirms.
pub fn confirmed_from(input: &mut impl BufRead) -> bool {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => line.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

/// Ask on stdout and block for the answer on stdin.
pub fn confirm() -> bool {
    println!("Is that correct? (y/n)");
    let stdin = std::io::stdin();
    confirmed_from(&mut stdin.lock())
}
