pub mod redis_health;
