//
// main.rs
//

use std::env;

fn print_usage() {
    println!(
        "tandem {}, a language server that follows identifier renames.",
        env!("CARGO_PKG_VERSION")
    );
    print!(
        r#"
Usage: tandem [OPTIONS]

Available options:

--stdio                      Start the LSP server using stdio transport
--version                    Print the version
--help                       Print this help message

Environment:

RUST_LOG                     Log filter (logs go to stderr)
TANDEM_PERF                  Set to 1 or verbose to log parse and index timings

"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut argv = env::args();
    argv.next(); // skip executable name

    let mut use_stdio = false;

    for arg in argv {
        match arg.as_str() {
            "--stdio" => use_stdio = true,
            "--version" => {
                println!("tandem {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_usage();
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("Unknown argument: '{other}'"));
            }
        }
    }

    if !use_stdio {
        print_usage();
        return Ok(());
    }

    env_logger::init();

    tandem::backend::start_lsp().await
}
