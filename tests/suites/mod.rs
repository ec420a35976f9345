use crate::Suite;

mod cache;
mod properties;

pub fn all() -> Vec<Suite> {
    vec![objects::suite(), cache::suite(), properties::suite()]
}
