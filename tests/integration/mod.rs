mod helpers;
mod test_commands;
mod test_dispatch;
mod test_release;
mod test_repository;
