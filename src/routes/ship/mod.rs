mod handler;
mod model;

pub use handler::{create_ship, delete_ship, get_ship_by_id, list_ships, update_ship};
