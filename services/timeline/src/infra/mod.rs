pub mod auth;
pub mod db;
pub mod events;
pub mod postgrest;
pub mod storage;
pub mod supabase;
