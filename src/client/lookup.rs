use std::collections::HashMap;

use crate::article::Article;

/// Group articles by headword, in order of each headword's first appearance.
pub fn group_by_word(articles: Vec<Article>) -> Vec<Vec<Article>> {
    let mut groups: Vec<Vec<Article>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for article in articles {
        match index.get(article.word()) {
            Some(&position) => groups[position].push(article),
            None => {
                index.insert(article.word().to_string(), groups.len());
                groups.push(vec![article]);
            }
        }
    }
    groups
}
