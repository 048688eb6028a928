use std::io::{self, Write};

use anyhow::Error;

use dft_forge::AssembleError;
use dft_forge::io::{Backend, Error as IoError, Format};

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    let hints = HintCollector::collect(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

#[derive(Default)]
struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn collect(err: &Error) -> Vec<String> {
        let mut collector = Self::default();

        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<AssembleError>() {
                collector.collect_assemble_hints(e);
            } else if let Some(e) = cause.downcast_ref::<IoError>() {
                collector.collect_io_hints(e);
            } else if let Some(e) = cause.downcast_ref::<std::io::Error>() {
                collector.collect_std_io_hints(e);
            }
        }

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }
        collector.hints
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_assemble_hints(&mut self, err: &AssembleError) {
        self.mark_typed();

        match err {
            AssembleError::Configuration(msg) => {
                if msg.contains("interface to code") || msg.contains("'code'") {
                    let codes: Vec<_> = Backend::ALL.iter().map(|b| b.code()).collect();
                    self.add(format!("Supported codes: {}", codes.join(", ")));
                    self.add("Set `code` in the file map or pass --code");
                } else if msg.contains("after 'structure'") {
                    self.add("The structure input locks the feature collection");
                    self.add("Move 'structure' to the end of the inputs list");
                } else if msg.contains("user") {
                    self.add("User properties are named user1, user2, ... (1-based)");
                } else {
                    self.add("Review the functional parameters file");
                }
            }

            AssembleError::ConfigParse(_) => {
                self.add("Functional parameters file has invalid TOML");
                self.add("Required keys: inputs (list) and output (string)");
                self.add("Optional: output_is_intensive, seed, [density], [formation_energies]");
            }

            // Reader causes are handled when the chain reaches them.
            AssembleError::Fetch { what, .. } => {
                self.add(format!("Could not obtain {what}"));
            }

            AssembleError::Transform(_) => {
                self.add("A density transform rejected the grid");
                self.add("Check [density] sample_step, normalize and n_conv against the grid size");
            }

            AssembleError::Correction(e) => {
                self.add(format!("{e}"));
                self.add("Add the element to [formation_energies] in the parameters");
                self.add("Or record it in the structure's own formation energies");
            }

            AssembleError::Locked { input } => {
                self.add(format!("'{input}' was added after the structure locked the features"));
                self.add("Move 'structure' to the end of the inputs list");
            }

            AssembleError::MissingDensity => {
                self.add("Cube output needs the 'density' input");
                self.add("Add \"density\" to the inputs list");
            }

            AssembleError::Output { .. } => {
                self.add("Check that the output directory exists and is writable");
            }
        }
    }

    fn collect_io_hints(&mut self, err: &IoError) {
        self.mark_typed();

        match err {
            IoError::Io { .. } => {}

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {line} in {format} data"
                ));
                self.add("Inspect the file around that line for malformed entries");
                self.add_format_specific_parse_hints(*format);
            }

            IoError::MissingPath { role } => {
                self.add(format!("No file is registered for '{role}'"));
                self.add(format!(
                    "Add `{role} = \"...\"` to the file map or pass --file {role}=PATH"
                ));
            }

            IoError::MissingProperty { property, .. } => {
                self.add(format!("The file does not report '{property}'"));
                self.add("Check that the calculation finished and the right file is mapped");
            }

            IoError::UnsupportedProperty { backend, property } => {
                self.add(format!("The {backend} reader has no '{property}' property"));
            }

            IoError::UserIndex { index, available } => {
                self.add(format!(
                    "user{index} was requested but the table has {available} data lines"
                ));
                self.add("Blank lines and # comments are not counted");
            }

            IoError::Toml { .. } => {
                self.add("The TOML input has a syntax or schema error");
            }
        }
    }

    fn add_format_specific_parse_hints(&mut self, format: Format) {
        match format {
            Format::Cube => {
                self.add("Cube: two comment lines, atom count, three axis lines, atoms, values")
            }
            Format::Chgcar => self.add("CHGCAR: grid dimensions must follow the positions block"),
            Format::Poscar => self.add("POSCAR: check the species and count lines"),
            Format::PwInput => {
                self.add("pw.x input: check nat, CELL_PARAMETERS and ATOMIC_POSITIONS")
            }
            Format::AimsGeometry => {
                self.add("geometry.in: use lattice_vector, atom or atom_frac lines")
            }
            Format::UserTable => self.add("User tables hold one property per line"),
            Format::Scalar => self.add("Scalar files hold exactly one number"),
            Format::Outcar | Format::PwOutput | Format::AimsOutput | Format::CustomStructure => {}
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        self.mark_typed();

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::InvalidData => {
                self.add("File is not valid UTF-8 text");
                self.add("Binary outputs must be converted to text first");
            }

            ErrorKind::BrokenPipe => {
                self.add("Broken pipe: the output consumer terminated");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("stdout is a terminal") {
            self.add("Pass -o/--output or pipe the JSON into another program");
        } else if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
