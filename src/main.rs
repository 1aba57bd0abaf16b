// src/main.rs
mod booking;
mod core;
mod dtos;
mod entity;
mod handlers;
mod routes;
mod services;
mod start;
mod state;
mod utils;

#[tokio::main]
async fn main() {
    start::run().await;
}
