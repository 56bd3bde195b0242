pub mod link_cache;
pub mod short_link;
