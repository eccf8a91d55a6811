mod common;
mod manager;
mod size;
