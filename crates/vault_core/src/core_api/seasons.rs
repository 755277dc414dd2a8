//! Season and event tables for D2 items.

/// (season, release year)
#[rustfmt::skip]
const SEASONS: &[(u32, u32)] = &[
    (1, 1), (2, 1), (3, 1),
    (4, 2), (5, 2), (6, 2), (7, 2),
    (8, 3), (9, 3), (10, 3), (11, 3),
];

#[rustfmt::skip]
const EVENTS: &[(u32, &str)] = &[
    (1, "The Dawning"),
    (2, "Crimson Days"),
    (3, "Solstice of Heroes"),
    (4, "Festival of the Lost"),
    (5, "The Revelry"),
    (6, "Guardian Games"),
];

pub fn season_year(season: u32) -> Option<u32> {
    SEASONS
        .iter()
        .find(|&&(id, _)| id == season)
        .map(|&(_, year)| year)
}

pub fn event_name(event: u32) -> Option<&'static str> {
    EVENTS
        .iter()
        .find(|&&(id, _)| id == event)
        .map(|&(_, name)| name)
}
