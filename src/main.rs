use std::path::PathBuf;

use branch_subset::git::{self, GitError};
use branch_subset::{
    CheckoutPolicy, ExtractError, ExtractMode, ExtractOptions, Extractor, TargetPath,
};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "branch-subset",
    version,
    about = "Create an orphan branch holding a single tracked file"
)]
struct Cli {
    /// File to extract, relative to the repository root or the current directory
    file: PathBuf,

    /// Repository to operate on (default: discovered from the current directory)
    #[arg(short = 'C', long = "repo", value_name = "PATH")]
    repo: Option<PathBuf>,

    /// Branch namespace (default: git config subset.prefix, else "subset")
    #[arg(long, value_name = "NAME")]
    prefix: Option<String>,

    /// Leave the new branch checked out
    #[arg(long, conflicts_with = "no_checkout")]
    stay: bool,

    /// Build the branch without touching HEAD, the index, or the working tree
    #[arg(long)]
    no_checkout: bool,

    /// Print a JSON report instead of the bare branch name
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(err) = e.downcast_ref::<ExtractError>() {
            print_hint(err);
        }
        std::process::exit(exit_code(&*e));
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;

    // Like `git -C`, a relative FILE is read relative to --repo when given.
    let base = match &cli.repo {
        Some(repo) => cwd.join(repo),
        None => cwd,
    };

    let repo = git::discover_repository(&base)?;

    let mut options = ExtractOptions::from_git_config(&repo)?;
    if let Some(prefix) = cli.prefix {
        options = options.with_prefix(prefix);
    }
    if cli.stay {
        options = options.with_policy(CheckoutPolicy::Stay);
    }
    if cli.no_checkout {
        options = options.with_mode(ExtractMode::Plumbing);
    }

    let extractor = Extractor::from_repository(repo, options)?;
    log::debug!("options: {:?}", extractor.options());
    let target = TargetPath::resolve(extractor.workdir(), &base, &cli.file)
        .map_err(ExtractError::from)?;

    let extraction = extractor.extract(&target)?;

    if cli.json {
        println!("{}", extraction.to_json()?);
    } else {
        println!("{}", extraction.branch);
    }
    log::info!("{}", extraction.submodule_hint());

    Ok(())
}

fn print_hint(err: &ExtractError) {
    match err {
        ExtractError::NotFound { .. } => {
            eprintln!("Hint: the file must be committed on the current checkout");
        }
        ExtractError::DirtyState { .. } => {
            eprintln!("Hint: commit or stash your changes, or use --no-checkout");
        }
        ExtractError::ToolInvocation { cleanup, .. } if !cleanup.is_empty() => {
            eprintln!(
                "Warning: {} rollback step(s) also failed; the repository may need manual cleanup",
                cleanup.len()
            );
        }
        _ => {}
    }
}

fn exit_code(err: &(dyn std::error::Error + 'static)) -> i32 {
    if let Some(e) = err.downcast_ref::<ExtractError>() {
        e.exit_code()
    } else if err.downcast_ref::<GitError>().is_some() {
        5
    } else {
        1
    }
}
