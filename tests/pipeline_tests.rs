use staq::evaluator::Evaluator;
use staq::lexer::tokenize;
use staq::parser::Parser;

// The pipeline must never panic, whatever bytes come in: the lexer
// downgrades garbage to illegal tokens, the parser reports and recovers,
// and the evaluator returns errors as values.
#[test]
fn pipeline_survives_random_garbage_inputs() {
    let mut seed = 0xC0FFEE1234_u64;

    for _ in 0..1_000 {
        let src = pseudo_random_source(&mut seed, 180);
        let tokens = tokenize(&src);

        if let Ok(program) = Parser::new(tokens).parse_program() {
            let mut evaluator = Evaluator::new();
            let _ = evaluator.eval_program(&program);
        }
    }
}

#[test]
fn lexer_consumes_arbitrary_input_to_eof() {
    let mut seed = 0xBADC0DE_u64;

    for _ in 0..1_000 {
        let src = pseudo_random_source(&mut seed, 120);
        let tokens = tokenize(&src);
        assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(staq::lexer::TokenKind::Eof)
        ));
    }
}

fn pseudo_random_source(seed: &mut u64, max_len: usize) -> String {
    const CHARSET: &[u8] =
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_ \n\t;,.+-*/%!<>=&|^~?(){}[]\"";

    let len = (next_u64(seed) as usize) % max_len;
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        let idx = (next_u64(seed) as usize) % CHARSET.len();
        out.push(CHARSET[idx] as char);
    }
    out
}

fn next_u64(seed: &mut u64) -> u64 {
    *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    *seed
}
