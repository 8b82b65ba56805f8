//! Backend paths. Trailing slashes on the collection routes are significant.

pub const GET_PLAYERS: &str = "/api/getPlayers/";
pub const GET_ITEMS: &str = "/api/getItems/";
pub const GET_LOOT_HISTORY: &str = "/api/getLootHistory/";
pub const GET_RAIDS: &str = "/api/getRaids/";
pub const GET_RAID_DAYS: &str = "/api/getRaidDays/";
pub const GET_CURRENT_USER: &str = "/api/getCurrentUser";

pub const UPDATE_PLAYER: &str = "/api/updatePlayer";
pub const UPDATE_ITEM: &str = "/api/updateItem";
pub const ADD_LOOT_HISTORY: &str = "/api/addLootHistory";
pub const UPDATE_LOOT_HISTORY: &str = "/api/updateLootHistory";
pub const DELETE_LOOT_HISTORY: &str = "/api/deleteLootHistory";
pub const UPLOAD_ATTENDANCE: &str = "/api/uploadAttendance";
pub const UPLOAD_LOOT_HISTORY: &str = "/api/uploadLootHistory";

pub const LOGIN: &str = "/login";
pub const SIGNUP: &str = "/signup";
pub const LOGOUT: &str = "/logout";
