//! Route modules for Lekha Server

pub mod download;
pub mod pages;
pub mod upload;
