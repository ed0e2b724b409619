use tantivy::tokenizer::{
	LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream,
};

use reelmatch_core::config::StopWords;

/// Tokens longer than this many bytes are dropped.
pub const MAX_TOKEN_LEN: usize = 40;
/// Tokens shorter than this many characters are dropped.
pub const MIN_TOKEN_CHARS: usize = 2;

pub const ENGLISH_STOP_WORDS: &[&str] = &[
	"a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
	"alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "amoungst",
	"amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere",
	"are", "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
	"been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
	"beyond", "bill", "both", "bottom", "but", "by", "call", "can", "cannot", "cant", "co", "con",
	"could", "couldnt", "cry", "de", "describe", "detail", "do", "done", "down", "due", "during",
	"each", "eg", "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc",
	"even", "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
	"fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty", "found",
	"four", "from", "front", "full", "further", "get", "give", "go", "had", "has", "hasnt", "have",
	"he", "hence", "her", "here", "hereafter", "hereby", "herein", "hereupon", "hers", "herself",
	"him", "himself", "his", "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed",
	"interest", "into", "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least",
	"less", "ltd", "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more",
	"moreover", "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely",
	"neither", "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor",
	"not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
	"or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
	"per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed", "seeming",
	"seems", "serious", "several", "she", "should", "show", "side", "since", "sincere", "six",
	"sixty", "so", "some", "somehow", "someone", "something", "sometime", "sometimes", "somewhere",
	"still", "such", "system", "take", "ten", "than", "that", "the", "their", "them", "themselves",
	"then", "thence", "there", "thereafter", "thereby", "therefore", "therein", "thereupon",
	"these", "they", "thick", "thin", "third", "this", "those", "though", "three", "through",
	"throughout", "thru", "thus", "to", "together", "too", "top", "toward", "towards", "twelve",
	"twenty", "two", "un", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well",
	"were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
	"whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither", "who",
	"whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would", "yet",
	"you", "your", "yours", "yourself", "yourselves",
];

/// Lowercased stop words for a configuration, sorted and deduplicated.
pub fn stop_word_list(stop_words: &StopWords) -> Vec<String> {
	let mut words: Vec<String> = match stop_words {
		StopWords::English => ENGLISH_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
		StopWords::None => Vec::new(),
		StopWords::Custom(list) => {
			list.iter().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()).collect()
		}
	};
	words.sort();
	words.dedup();
	words
}

/// Split on non-alphanumerics, drop over-long tokens, lowercase, drop stop words.
pub fn build_analyzer(stop_words: &StopWords) -> TextAnalyzer {
	let words = stop_word_list(stop_words);
	let builder = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(RemoveLongFilter::limit(MAX_TOKEN_LEN + 1))
		.filter(LowerCaser);
	if words.is_empty() {
		builder.build()
	} else {
		builder.filter(StopWordFilter::remove(words)).build()
	}
}

/// Run `text` through the analyzer and keep tokens of at least two characters.
pub fn tokenize(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut tokens = Vec::new();
	let mut stream = analyzer.token_stream(text);
	while stream.advance() {
		let token = &stream.token().text;
		if token.chars().count() >= MIN_TOKEN_CHARS {
			tokens.push(token.clone());
		}
	}
	tokens
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn english_analyzer_lowercases_splits_and_drops_stop_words() {
		let mut analyzer = build_analyzer(&StopWords::English);
		let tokens = tokenize(&mut analyzer, "Batman fights the Joker");
		assert_eq!(tokens, vec!["batman", "fights", "joker"]);
		let tokens = tokenize(&mut analyzer, "Action Adventure Sci-Fi");
		assert_eq!(tokens, vec!["action", "adventure", "sci", "fi"]);
	}

	#[test]
	fn single_characters_and_long_tokens_are_dropped() {
		let mut analyzer = build_analyzer(&StopWords::None);
		let long = "x".repeat(MAX_TOKEN_LEN + 1);
		let limit = "y".repeat(MAX_TOKEN_LEN);
		let text = format!("a b cd {long} {limit}");
		assert_eq!(tokenize(&mut analyzer, &text), vec!["cd".to_string(), limit]);
	}

	#[test]
	fn custom_stop_words_are_case_insensitive() {
		let mut analyzer = build_analyzer(&StopWords::Custom(vec!["Drama".into(), " ".into()]));
		assert_eq!(tokenize(&mut analyzer, "Crime Drama"), vec!["crime"]);
		let custom = StopWords::Custom(vec!["B".into(), "a".into(), "b".into()]);
		assert_eq!(stop_word_list(&custom), vec!["a", "b"]);
	}
}
