mod auth;
mod frames;
