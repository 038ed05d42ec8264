use once_cell::sync::Lazy;
use regex::Regex;

// RFC 1123 label, the grammar the apiserver enforces on resource names.
static DNS_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap());

const MAX_LABEL_LEN: usize = 63;

pub(crate) fn is_valid_vm_name(name: &str) -> bool {
    name.len() <= MAX_LABEL_LEN && DNS_LABEL.is_match(name)
}

pub(crate) fn service_name(vm_name: &str) -> String {
    format!("{}-service", vm_name)
}

pub(crate) fn ingress_name(vm_name: &str) -> String {
    format!("{}-ingress", vm_name)
}

pub(crate) fn terminal_path(vm_name: &str) -> String {
    format!("/ttyd/{}", vm_name)
}

// Without a configured ingress host the bare path is returned, a host is
// never guessed.
pub(crate) fn terminal_url(ingress_host: Option<&str>, vm_name: &str) -> String {
    match ingress_host {
        Some(host) => format!("https://{}{}", host, terminal_path(vm_name)),
        None => terminal_path(vm_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_names_follow_the_convention() {
        assert_eq!(service_name("demo"), "demo-service");
        assert_eq!(ingress_name("demo"), "demo-ingress");
        assert_eq!(terminal_path("demo"), "/ttyd/demo");
    }

    #[test]
    fn terminal_url_includes_the_host_only_when_configured() {
        assert_eq!(terminal_url(None, "demo"), "/ttyd/demo");
        assert_eq!(
            terminal_url(Some("vm.example.com"), "demo"),
            "https://vm.example.com/ttyd/demo"
        );
    }

    #[test]
    fn vm_names_must_be_dns_labels() {
        assert!(is_valid_vm_name("demo"));
        assert!(is_valid_vm_name("demo-01"));
        assert!(is_valid_vm_name("0abc"));
        assert!(is_valid_vm_name("a"));
        assert!(!is_valid_vm_name(""));
        assert!(!is_valid_vm_name("Demo"));
        assert!(!is_valid_vm_name("-demo"));
        assert!(!is_valid_vm_name("demo-"));
        assert!(!is_valid_vm_name("demo.vm"));
        assert!(!is_valid_vm_name("demo_vm"));
        assert!(!is_valid_vm_name(&"a".repeat(64)));
    }
}
