use std::cmp::Ordering;

/// Sort key used for alphabetical ordering: lowercase with the Portuguese
/// diacritics folded, so `Ágata` lands next to `agata`.
pub fn collation_key(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold)
        .collect()
}

/// Total alphabetical order: collation key first, raw text as tie-breaker.
pub fn compare(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn fold(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accents_and_case_fold() {
        assert_eq!(collation_key("Ficção Científica"), "ficcao cientifica");
        assert_eq!(compare("Ágata", "Bruno"), Ordering::Less);
        assert_eq!(compare("ágata", "Agata"), Ordering::Greater);
    }

    #[test]
    fn digits_sort_before_letters() {
        assert_eq!(compare("DESC5", "DESCONTO10"), Ordering::Less);
    }
}
