mod aggregate;
mod buckets;
mod common;
