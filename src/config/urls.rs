//! Download and repository URLs

/// Xapian release archive base URL
///
/// Archives live at `<base>/<version>/<package>-<version>.tar.gz`.
pub const XAPIAN_DOWNLOAD: &str = "http://oligarchy.co.uk/xapian";

/// django-haystack git repository
pub const HAYSTACK_REPOSITORY: &str = "https://github.com/django-haystack/django-haystack.git";
