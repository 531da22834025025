//! Brand and competitor domain matching.

use brandlens_core::{Citation, EvaluationContext, RankedEntity};

/// Normalize a domain or URL down to a bare host: lower-cased, scheme and
/// path stripped, port and trailing dot removed, leading "www." dropped.
pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim().to_ascii_lowercase();

    // Full URLs go through the parser; bare hosts would fail it.
    let host = if trimmed.contains("://") {
        match url::Url::parse(&trimmed) {
            Ok(parsed) => parsed.host_str().unwrap_or("").to_string(),
            Err(_) => trimmed,
        }
    } else {
        // Strip any path or query that arrived without a scheme.
        trimmed
            .split(['/', '?', '#'])
            .next()
            .unwrap_or("")
            .to_string()
    };

    let host = host.split(':').next().unwrap_or("");
    let host = host.trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.to_string()
}

/// True when `candidate` equals one of `domains` or is a subdomain of one
/// (`blog.acme.com` matches `acme.com`). Both sides are normalized first.
pub fn domain_matches(candidate: &str, domains: &[String]) -> bool {
    let candidate = normalize_domain(candidate);
    if candidate.is_empty() {
        return false;
    }
    domains.iter().any(|d| {
        let domain = normalize_domain(d);
        if domain.is_empty() {
            return false;
        }
        candidate == domain
            || candidate
                .strip_suffix(&domain)
                .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// True when `candidate` belongs to the brand of `ctx`.
pub fn domain_matches_brand(candidate: &str, ctx: &EvaluationContext) -> bool {
    domain_matches(candidate, &ctx.brand_domains)
}

/// Case-insensitive whole-word match of the brand name inside `name`.
/// Only consulted for entities that carry no domain.
pub fn name_matches_brand(name: &str, ctx: &EvaluationContext) -> bool {
    let name = name.to_lowercase();
    let brand = ctx.brand_name.trim().to_lowercase();
    if brand.is_empty() || name.is_empty() {
        return false;
    }

    name.match_indices(&brand).any(|(start, matched)| {
        let boundary_before = !name[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        let boundary_after = !name[start + matched.len()..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);
        boundary_before && boundary_after
    })
}

/// Entity match: by domain when the entity has one, by name otherwise.
pub fn entity_matches_brand(entity: &RankedEntity, ctx: &EvaluationContext) -> bool {
    match entity.domain.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(domain) => domain_matches_brand(domain, ctx),
        None => name_matches_brand(&entity.name, ctx),
    }
}

/// Citation match: by the parsed `domain` field when present, by the raw URL
/// otherwise.
pub fn citation_matches_brand(citation: &Citation, ctx: &EvaluationContext) -> bool {
    match citation.domain.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(domain) => domain_matches_brand(domain, ctx),
        None => domain_matches_brand(&citation.url, ctx),
    }
}
