/// Minimal `multipart/form-data` reader for the upload form.
///
/// Only what the studio needs: locate the file part for a given field name
/// and recover its original file name.

/// A file part pulled out of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// Finds the file part whose `Content-Disposition` names `field_name`.
///
/// Returns `None` when no such part exists. A part that was submitted with
/// no file selected comes back with empty `bytes`.
pub fn extract_file(body: &[u8], boundary: &str, field_name: &str) -> Option<FilePart> {
    let delimiter = format!("--{}", boundary);
    let name_attr = format!("; name=\"{}\"", field_name);

    for part in split_on(body, delimiter.as_bytes()) {
        let sep = b"\r\n\r\n";
        let Some(sep_pos) = find_subsequence(part, sep) else { continue };

        let headers = String::from_utf8_lossy(&part[..sep_pos]);
        if !headers.contains(&name_attr) {
            continue;
        }
        let Some(file_name) = quoted_attr(&headers, "filename") else { continue };

        let raw = &part[sep_pos + sep.len()..];
        let bytes = raw.strip_suffix(b"\r\n").unwrap_or(raw).to_vec();
        return Some(FilePart { file_name, bytes });
    }
    None
}

/// Parses `key="..."` from a header block. Path components some browsers
/// send in `filename` are dropped.
fn quoted_attr(headers: &str, key: &str) -> Option<String> {
    let needle = format!("{}=\"", key);
    let pos = headers.find(&needle)?;
    let rest = &headers[pos + needle.len()..];
    let end = rest.find('"')?;
    let value = &rest[..end];
    let base = value.rsplit(['/', '\\']).next().unwrap_or(value);
    Some(base.to_owned())
}
