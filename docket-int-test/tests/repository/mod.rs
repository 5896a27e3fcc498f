mod create_test;
mod delete_test;
mod delta_test;
mod entity_repository_test;
mod update_test;
