//! Routes that only accept the app's own identity.

/// Route templates; `{…}` matches any single non-empty segment.
const APP_ROUTES: &[&str] = &[
    "/app",
    "/app/hook/config",
    "/app/hook/deliveries",
    "/app/hook/deliveries/{delivery_id}",
    "/app/hook/deliveries/{delivery_id}/attempts",
    "/app/installations",
    "/app/installations/{installation_id}",
    "/app/installations/{installation_id}/access_tokens",
    "/app/installations/{installation_id}/suspended",
    "/app/installation-requests",
    "/marketplace_listing/accounts/{account_id}",
    "/marketplace_listing/plan",
    "/marketplace_listing/plans",
    "/marketplace_listing/plans/{plan_id}/accounts",
    "/marketplace_listing/stubbed/accounts/{account_id}",
    "/marketplace_listing/stubbed/plan",
    "/marketplace_listing/stubbed/plans",
    "/marketplace_listing/stubbed/plans/{plan_id}/accounts",
    "/orgs/{org}/installation",
    "/repos/{owner}/{repo}/installation",
    "/users/{username}/installation",
];

/// Whether `path` must be authenticated with the app JWT rather than an
/// installation token.
pub fn requires_app_auth(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');
    APP_ROUTES.iter().any(|route| matches_route(route, path))
}

/// Whether `path` is an OAuth client route (`/applications/{client_id}/token`,
/// `/tokens`, `/grant` or `/grants`) that takes the client credentials.
///
/// The pattern may appear below an API prefix such as `/api/v3`.
pub fn requires_client_auth(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').collect();
    segments.windows(3).any(|w| {
        w[0] == "applications"
            && !w[1].is_empty()
            && matches!(w[2], "token" | "tokens" | "grant" | "grants")
    })
}

fn matches_route(route: &str, path: &str) -> bool {
    let mut route_segments = route.split('/');
    let mut path_segments = path.split('/');

    loop {
        match (route_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(r), Some(p)) => {
                let placeholder = r.starts_with('{') && r.ends_with('}');
                if placeholder {
                    if p.is_empty() {
                        return false;
                    }
                } else if r != p {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
