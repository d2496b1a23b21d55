mod browse;
mod cached;
mod favorites;
mod helpers;
mod home;
mod search;

pub(crate) use browse::{cmd_area, cmd_areas, cmd_categories, cmd_category};
pub(crate) use cached::{cmd_cached_delete, cmd_cached_list, cmd_cached_purge, cmd_cached_search};
pub(crate) use favorites::{
    cmd_favorites_add, cmd_favorites_list, cmd_favorites_remove, cmd_favorites_toggle,
};
pub(crate) use helpers::json_error;
pub(crate) use home::{cmd_home, cmd_random, cmd_show};
pub(crate) use search::cmd_search;
