use env_logger::Env;
use jobdesk::cli::run;
use jobdesk::error::JobError;

/// Store and I/O failures are internal; everything else is the user's to fix
fn is_internal(e: &anyhow::Error) -> bool {
    if let Some(job_err) = e.downcast_ref::<JobError>() {
        return !job_err.is_recoverable();
    }
    e.chain().any(|cause| cause.is::<rusqlite::Error>() || cause.is::<std::io::Error>())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        if is_internal(&e) {
            eprintln!("Internal error: {}", e);
            let mut causes = e.chain().skip(1).peekable();
            if causes.peek().is_some() {
                eprintln!("\nCaused by:");
                for (indent, cause) in causes.enumerate() {
                    eprintln!("{:indent$}  {}", "", cause, indent = indent + 1);
                }
            }
            std::process::exit(2);
        } else {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
