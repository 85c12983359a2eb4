use projector::core::context::ProjectContext;
use projector::core::error::{ProjectorError, print_error};
use projector::core::process::SystemRunner;
use projector::plugin::{Dispatcher, PluginRegistry};
use std::sync::Arc;

fn main() {
  projector::ui::init_logging();

  let root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let project = ProjectContext::new(root, Arc::new(SystemRunner));
  let mut dispatcher = Dispatcher::new(PluginRegistry::builtin(), project);
  if let Err(err) = dispatcher.dispatch(std::env::args_os()) {
    handle_error(err);
  }
}

fn handle_error(err: ProjectorError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
