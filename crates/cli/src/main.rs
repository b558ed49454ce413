//! create-dom-document
//!
//! Builds a small document from scratch in memory, prints how many
//! elements it contains and then the document itself as XML.
//!
//! Exit codes: 0 success, 1 usage or initialization failure, otherwise
//! `DomError::exit_code` of the failure.

mod demo;

use clap::Parser;
use dom::{DomError, DomSerializer, SerializerConfig, WILDCARD};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\nUsage:\n    create-dom-document\n\n\
This program creates a new DOM document from scratch in memory.\n\
It then prints the count of elements in the tree.\n";

#[derive(Parser, Debug)]
#[command(
    name = "create-dom-document",
    about = "Create a DOM document in memory and print it as XML"
)]
struct Cli {}

fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

fn run() -> dom::Result<()> {
    let document = demo::build_company_document()?;

    let element_count = document.elements_by_tag_name(WILDCARD).count();
    tracing::debug!(element_count, "built demonstration tree");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "The tree just created contains: {} elements.",
        element_count
    )?;

    let serializer = DomSerializer::with_config(SerializerConfig::default());
    serializer.write(&document, &mut out)?;
    writeln!(out)?;

    Ok(())
}

/// One message per error kind, mirrored by the exit code
fn report(err: &DomError) -> String {
    match err {
        DomError::OutOfMemory(_) => format!("OutOfMemoryException: {}", err),
        DomError::InvalidArgument(_)
        | DomError::InvalidState(_)
        | DomError::WrongDocument(_)
        | DomError::NotFound(_) => match err.dom_code() {
            Some(code) => format!("DOMException code is: {}\n  {}", code, err),
            None => format!("DOMException: {}", err),
        },
        DomError::NotSupported(_) => format!("Requested implementation is not supported: {}", err),
        DomError::Io(_) | DomError::Config(_) | DomError::Internal(_) => {
            format!("An error occurred creating the document: {}", err)
        }
    }
}

fn main() -> ExitCode {
    if Cli::try_parse().is_err() {
        println!("{}", USAGE);
        return ExitCode::from(1);
    }

    if let Err(err) = init_tracing() {
        eprintln!("Error during initialization.\n  Exception message: {}", err);
        return ExitCode::from(1);
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "document creation failed");
            eprintln!("{}", report(&err));
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_rejects_arguments() {
        assert!(Cli::try_parse_from(["create-dom-document"]).is_ok());
        assert!(Cli::try_parse_from(["create-dom-document", "extra"]).is_err());
        assert!(Cli::try_parse_from(["create-dom-document", "--verbose"]).is_err());
    }

    #[test]
    fn test_report_is_distinct_per_kind() {
        let structural = report(&DomError::InvalidState("attached".into()));
        let unsupported = report(&DomError::NotSupported("UTF-16".into()));
        let memory = report(&DomError::OutOfMemory("arena".into()));
        let internal = report(&DomError::Internal("boom".into()));

        assert!(structural.starts_with("DOMException code is: 3\n"));
        assert!(report(&DomError::WrongDocument("#2".into())).starts_with("DOMException code is: 4"));
        assert!(unsupported.starts_with("Requested implementation"));
        assert!(memory.starts_with("OutOfMemoryException"));
        assert!(internal.starts_with("An error occurred"));
    }
}
