//! Named view states and their URL templates.
//!
//! A state's full URL is the concatenation of its own template with those of
//! its dotted ancestors, so `destiny2.inventory` resolves to
//! `/:membershipId/d2` + `/inventory`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::accounts::DestinyAccount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    #[default]
    Release,
    Dev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub name: &'static str,
    pub url: &'static str,
    pub dev_only: bool,
}

#[rustfmt::skip]
const ROUTES: &[RouteDef] = &[
    RouteDef { name: "login",                    url: "/login",                                   dev_only: false },
    RouteDef { name: "about",                    url: "/about",                                   dev_only: false },
    RouteDef { name: "privacy",                  url: "/privacy",                                 dev_only: false },
    RouteDef { name: "whats-new",                url: "/whats-new",                               dev_only: false },
    RouteDef { name: "settings",                 url: "/settings?gdrive",                         dev_only: false },
    RouteDef { name: "gdrive-revisions",         url: "/settings/gdrive-revisions",               dev_only: false },
    RouteDef { name: "developer",                url: "/developer",                               dev_only: true  },
    RouteDef { name: "destiny1",                 url: "/:membershipId/d1",                        dev_only: false },
    RouteDef { name: "destiny1.inventory",       url: "/inventory",                               dev_only: false },
    RouteDef { name: "destiny1.loadout-builder", url: "/loadout-builder",                         dev_only: false },
    RouteDef { name: "destiny1.record-books",    url: "/record-books",                            dev_only: false },
    RouteDef { name: "destiny1.activities",      url: "/activities",                              dev_only: false },
    RouteDef { name: "destiny2",                 url: "/:membershipId/d2",                        dev_only: false },
    RouteDef { name: "destiny2.inventory",       url: "/inventory",                               dev_only: false },
    RouteDef { name: "destiny2.loadoutbuilder",  url: "/loadoutbuilder",                          dev_only: false },
    RouteDef { name: "destiny2.progress",        url: "/progress",                                dev_only: false },
    RouteDef { name: "destiny2.collections",     url: "/collections?{presentationNodeHash:int}",  dev_only: false },
    RouteDef { name: "destiny2.vendors",         url: "/vendors?characterId",                     dev_only: false },
    RouteDef { name: "destiny2.vendor",          url: "/vendors/:id?characterId",                 dev_only: false },
];

pub fn routes(flavor: Flavor) -> impl Iterator<Item = &'static RouteDef> {
    ROUTES
        .iter()
        .filter(move |route| flavor == Flavor::Dev || !route.dev_only)
}

pub fn find_route(flavor: Flavor, name: &str) -> Option<&'static RouteDef> {
    routes(flavor).find(|route| route.name == name)
}

/// A state to navigate to together with its URL parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTarget {
    pub state: String,
    pub params: BTreeMap<String, String>,
}

impl RouteTarget {
    pub fn url(&self, flavor: Flavor) -> Option<String> {
        url_for(flavor, &self.state, &self.params)
    }
}

/// Where to send a visitor who arrived without a specific view: the active
/// account's inventory, or nowhere when no account is known.
pub fn default_account_route(active: Option<&DestinyAccount>) -> Option<RouteTarget> {
    let account = active?;
    let mut params = BTreeMap::new();
    params.insert("membershipId".to_string(), account.membership_id.clone());
    Some(RouteTarget {
        state: format!("destiny{}.inventory", account.destiny_version.number()),
        params,
    })
}

/// Build the URL path for a state. Returns `None` for unknown states or when
/// a required path parameter is missing.
pub fn url_for(flavor: Flavor, state: &str, params: &BTreeMap<String, String>) -> Option<String> {
    let mut url = String::new();
    let mut prefix_end = 0;
    loop {
        let next_dot = state[prefix_end..].find('.').map(|i| prefix_end + i);
        let prefix = &state[..next_dot.unwrap_or(state.len())];
        let route = find_route(flavor, prefix)?;
        append_path(&mut url, route.url, params)?;

        match next_dot {
            Some(dot) => prefix_end = dot + 1,
            None => break,
        }
    }
    Some(url)
}

fn append_path(url: &mut String, template: &str, params: &BTreeMap<String, String>) -> Option<()> {
    let path = template.split('?').next().unwrap_or_default();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        url.push('/');
        match segment.strip_prefix(':') {
            Some(param) => url.push_str(params.get(param)?),
            None => url.push_str(segment),
        }
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_state_joins_ancestor_urls() {
        let mut params = BTreeMap::new();
        params.insert("membershipId".to_string(), "4611686018".to_string());
        params.insert("id".to_string(), "672118013".to_string());

        assert_eq!(
            url_for(Flavor::Release, "destiny2.inventory", &params).as_deref(),
            Some("/4611686018/d2/inventory")
        );
        assert_eq!(
            url_for(Flavor::Release, "destiny2.vendor", &params).as_deref(),
            Some("/4611686018/d2/vendors/672118013")
        );
        assert_eq!(
            url_for(Flavor::Release, "destiny2.collections", &params).as_deref(),
            Some("/4611686018/d2/collections")
        );
    }

    #[test]
    fn missing_param_or_unknown_state_yields_none() {
        let params = BTreeMap::new();
        assert_eq!(url_for(Flavor::Release, "destiny2.inventory", &params), None);
        assert_eq!(url_for(Flavor::Release, "destiny3.inventory", &params), None);
        assert_eq!(
            url_for(Flavor::Release, "about", &params).as_deref(),
            Some("/about")
        );
    }

    #[test]
    fn developer_route_only_exists_in_dev_flavor() {
        let params = BTreeMap::new();
        assert_eq!(url_for(Flavor::Release, "developer", &params), None);
        assert_eq!(
            url_for(Flavor::Dev, "developer", &params).as_deref(),
            Some("/developer")
        );
    }
}
