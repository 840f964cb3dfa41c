// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MysurianError>;

#[derive(Error, Debug)]
pub enum MysurianError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Document not found: {0}/{1}")]
    DocumentNotFound(String, String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Disk I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Scan failed: {0}")]
    ScanFailed(String),

    #[error("Invalid scope: {0}")]
    InvalidScope(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Sign-in required")]
    SignInRequired,

    #[error("Sign-in cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },
}
