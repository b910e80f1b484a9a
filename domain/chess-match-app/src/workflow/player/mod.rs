pub mod get_player;
