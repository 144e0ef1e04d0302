use pretty_assertions::assert_eq;
use readit::domain::tts::{optimize_text, split_text_into_chunks};

const AI_ARTICLE: &str = "Artificial intelligence (AI) is a branch of computer science that aims to create systems capable of performing tasks that would normally require human intelligence. These tasks include learning, reasoning, problem-solving, perception, and language understanding. AI is an interdisciplinary field that incorporates elements from various fields, including computer science, psychology, linguistics, philosophy, and neuroscience.

        AI can be classified into two main types. Narrow AI, which is designed to perform a narrow task (such as facial recognition or internet searches). General AI, which can perform any intellectual task that a human being can do. While narrow AI is a reality today and is being used in a wide range of applications, general AI is still largely theoretical, with no practical implementations in use today.

        AI technologies have the potential to bring immense benefits to society. They can help improve productivity, enhance the quality of services, and solve complex problems. However, they also pose significant challenges and risks. These include concerns about privacy, security, job displacement, and the ethical implications of AI decision-making.

        As AI continues to advance and become more integrated into our daily lives, it is crucial that we continue to explore these issues and develop strategies to mitigate the potential negative impacts of AI, while maximizing its benefits. This will require ongoing research, thoughtful policy-making, and a commitment to ethical principles in the development and use of AI technologies.";

#[test]
fn it_should_split_medium_sized_text_into_chunks() {
    let chunks = split_text_into_chunks(AI_ARTICLE, 300);

    assert_eq!(
        chunks,
        vec![
            "Artificial intelligence (AI) is a branch of computer science that aims to create systems capable of performing tasks that would normally require human intelligence. These tasks include learning, reasoning, problem-solving, perception, and language understanding.",
            "AI is an interdisciplinary field that incorporates elements from various fields, including computer science, psychology, linguistics, philosophy, and neuroscience. AI can be classified into two main types.",
            "Narrow AI, which is designed to perform a narrow task (such as facial recognition or internet searches). General AI, which can perform any intellectual task that a human being can do.",
            "While narrow AI is a reality today and is being used in a wide range of applications, general AI is still largely theoretical, with no practical implementations in use today. AI technologies have the potential to bring immense benefits to society.",
            "They can help improve productivity, enhance the quality of services, and solve complex problems. However, they also pose significant challenges and risks. These include concerns about privacy, security, job displacement, and the ethical implications of AI decision-making.",
            "As AI continues to advance and become more integrated into our daily lives, it is crucial that we continue to explore these issues and develop strategies to mitigate the potential negative impacts of AI, while maximizing its benefits.",
            "This will require ongoing research, thoughtful policy-making, and a commitment to ethical principles in the development and use of AI technologies.",
        ]
    );
}

#[test]
fn it_should_keep_every_chunk_within_the_bound() {
    let text = optimize_text(AI_ARTICLE);

    for max in [1, 7, 40, 120, 300, 4096] {
        for chunk in split_text_into_chunks(&text, max) {
            assert!(
                chunk.chars().count() <= max,
                "chunk of {} chars exceeds {}: {:?}",
                chunk.chars().count(),
                max,
                chunk
            );
            assert!(!chunk.is_empty(), "empty chunk at max {}", max);
        }
    }
}

#[test]
fn it_should_not_lose_characters_when_splitting() {
    let text = optimize_text(AI_ARTICLE);

    for max in [50, 120, 300] {
        let chunks = split_text_into_chunks(&text, max);
        assert_eq!(
            chunks.concat().replace(' ', ""),
            text.replace(' ', ""),
            "text changed at max {}",
            max
        );
    }

    // Sentence packing alone rejoins with single spaces
    assert_eq!(split_text_into_chunks(&text, 300).join(" "), text);
}

#[test]
fn it_should_not_split_text_that_fits() {
    let text = optimize_text(AI_ARTICLE);
    let chunks = split_text_into_chunks(&text, 4096);
    assert_eq!(chunks, vec![text]);
}

#[test]
fn it_should_split_multibyte_text_on_character_boundaries() {
    let text = "Ça va très bien. ¿Qué tal estás? Très bien, merci! 日本語のテキストです。";
    let chunks = split_text_into_chunks(text, 12);

    assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 12));
    assert_eq!(chunks.concat().replace(' ', ""), text.replace(' ', ""));
}
