// Deterministic beam search for encoder/decoder summarizers
// Lengths include the decoder start token; one beam is plain greedy decoding.

use anyhow::Result;

use crate::types::LengthBudget;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub min_length: usize,
    pub max_length: usize,
    pub num_beams: usize,
    pub no_repeat_ngram_size: usize,
    pub length_penalty: f32,
    pub early_stopping: bool,
    pub decoder_start_token_id: u32,
    pub eos_token_id: u32,
    pub forced_bos_token_id: Option<u32>,
    pub forced_eos_token_id: Option<u32>,
}

impl GenerationParams {
    pub fn with_budget(mut self, budget: LengthBudget) -> Self {
        self.min_length = budget.min_length;
        self.max_length = budget.max_length.max(2);
        self
    }
}

#[derive(Debug, Clone)]
struct Beam {
    tokens: Vec<u32>,
    score: f32,
}

pub fn log_softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![f32::NEG_INFINITY; logits.len()];
    }
    let sum: f32 = logits.iter().map(|&x| (x - max).exp()).sum();
    let log_sum = sum.ln() + max;
    logits.iter().map(|&x| x - log_sum).collect()
}

/// Tokens that would repeat an n-gram already present in `tokens`.
pub fn banned_ngram_tokens(tokens: &[u32], n: usize) -> Vec<u32> {
    if n == 0 || tokens.len() + 1 < n {
        return Vec::new();
    }
    if n == 1 {
        return tokens.to_vec();
    }
    let prefix = &tokens[tokens.len() - (n - 1)..];
    tokens
        .windows(n)
        .filter(|window| &window[..n - 1] == prefix)
        .map(|window| window[n - 1])
        .collect()
}

/// Indices of the `k` largest finite values, best first.
pub fn top_k(values: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut best: Vec<(usize, f32)> = Vec::with_capacity(k + 1);
    for (idx, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        if best.len() == k && best.last().map_or(false, |&(_, worst)| value <= worst) {
            continue;
        }
        let pos = best.iter().position(|&(_, v)| value > v).unwrap_or(best.len());
        best.insert(pos, (idx, value));
        best.truncate(k);
    }
    best
}

fn normalized(score: f32, generated: usize, length_penalty: f32) -> f32 {
    score / (generated.max(1) as f32).powf(length_penalty)
}

fn apply_constraints(scores: &mut [f32], tokens: &[u32], params: &GenerationParams) {
    let cur_len = tokens.len();
    let eos = params.eos_token_id as usize;

    if cur_len < params.min_length && eos < scores.len() {
        scores[eos] = f32::NEG_INFINITY;
    }

    for token in banned_ngram_tokens(tokens, params.no_repeat_ngram_size) {
        if let Some(score) = scores.get_mut(token as usize) {
            *score = f32::NEG_INFINITY;
        }
    }

    let forced = if cur_len == 1 {
        params.forced_bos_token_id
    } else if cur_len + 1 == params.max_length {
        params.forced_eos_token_id
    } else {
        None
    };
    if let Some(forced) = forced.map(|t| t as usize).filter(|&t| t < scores.len()) {
        for (idx, score) in scores.iter_mut().enumerate() {
            *score = if idx == forced { 0.0 } else { f32::NEG_INFINITY };
        }
    }
}

/// Run beam search and return the best token sequence, starting with the
/// decoder start token.
pub fn beam_search<F>(params: &GenerationParams, mut step: F) -> Result<Vec<u32>>
where
    F: FnMut(&[Vec<u32>]) -> Result<Vec<Vec<f32>>>,
{
    let num_beams = params.num_beams.max(1);
    let early_stopping = params.early_stopping || num_beams == 1;
    let mut beams = vec![Beam { tokens: vec![params.decoder_start_token_id], score: 0.0 }];
    let mut finished: Vec<(f32, Vec<u32>)> = Vec::new();
    let mut cur_len = 1;
    let mut done = false;

    while cur_len < params.max_length {
        let sequences: Vec<Vec<u32>> = beams.iter().map(|b| b.tokens.clone()).collect();
        let logits = step(&sequences)?;
        if logits.len() != beams.len() {
            anyhow::bail!("decoder returned {} rows for {} beams", logits.len(), beams.len());
        }

        let mut candidates: Vec<(f32, usize, u32)> = Vec::new();
        for (beam_idx, (beam, row)) in beams.iter().zip(&logits).enumerate() {
            let mut scores = log_softmax(row);
            apply_constraints(&mut scores, &beam.tokens, params);
            for (token, logp) in top_k(&scores, 2 * num_beams) {
                candidates.push((beam.score + logp, beam_idx, token as u32));
            }
        }
        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut next = Vec::with_capacity(num_beams);
        for (rank, (score, beam_idx, token)) in candidates.into_iter().enumerate() {
            let parent = &beams[beam_idx];
            if token == params.eos_token_id {
                if rank >= num_beams {
                    continue;
                }
                let mut tokens = parent.tokens.clone();
                tokens.push(token);
                let hyp_score = normalized(score, parent.tokens.len() - 1, params.length_penalty);
                finished.push((hyp_score, tokens));
                finished.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
                finished.truncate(num_beams);
            } else {
                let mut tokens = parent.tokens.clone();
                tokens.push(token);
                next.push(Beam { tokens, score });
            }
            if next.len() == num_beams {
                break;
            }
        }

        if next.is_empty() {
            beams.clear();
            break;
        }
        beams = next;
        cur_len += 1;

        if finished.len() >= num_beams {
            let best_running = normalized(beams[0].score, cur_len - 1, params.length_penalty);
            let worst_finished = finished.last().map(|f| f.0).unwrap_or(f32::NEG_INFINITY);
            if early_stopping || worst_finished >= best_running {
                done = true;
                break;
            }
        }
    }

    // Unless the search settled, beams still running at max_length compete
    // with the finished hypotheses for the num_beams slots.
    if !done {
        for beam in &beams {
            let generated = beam.tokens.len().saturating_sub(1);
            finished.push((normalized(beam.score, generated, params.length_penalty), beam.tokens.clone()));
        }
        finished.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        finished.truncate(num_beams);
    }

    finished
        .into_iter()
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, tokens)| tokens)
        .ok_or_else(|| anyhow::anyhow!("decoding produced no sequence"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOCAB: usize = 8;
    const START: u32 = 2;
    const EOS: u32 = 2;
    const BOS: u32 = 0;

    fn params(min_length: usize, max_length: usize, num_beams: usize) -> GenerationParams {
        GenerationParams {
            min_length,
            max_length,
            num_beams,
            no_repeat_ngram_size: 0,
            length_penalty: 1.0,
            early_stopping: true,
            decoder_start_token_id: START,
            eos_token_id: EOS,
            forced_bos_token_id: None,
            forced_eos_token_id: None,
        }
    }

    fn one_hot(token: u32, strength: f32) -> Vec<f32> {
        let mut row = vec![0.0; VOCAB];
        row[token as usize] = strength;
        row
    }

    #[test]
    fn log_softmax_normalizes() {
        let out = log_softmax(&[1.0, 2.0, 3.0]);
        let total: f32 = out.iter().map(|x| x.exp()).sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(out[2] > out[1] && out[1] > out[0]);
    }

    #[test]
    fn top_k_orders_and_skips_infinite() {
        let picked = top_k(&[0.1, f32::NEG_INFINITY, 0.7, 0.3], 2);
        assert_eq!(picked.iter().map(|p| p.0).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn bans_repeated_trigram() {
        // "5 6 7 5 6" -> 7 would repeat "5 6 7"
        assert_eq!(banned_ngram_tokens(&[5, 6, 7, 5, 6], 3), vec![7]);
        assert!(banned_ngram_tokens(&[5, 6], 3).is_empty());
        assert!(banned_ngram_tokens(&[5, 6, 7], 0).is_empty());
    }

    #[test]
    fn greedy_stops_at_eos() {
        // 4, 5, then EOS
        let result = beam_search(&params(0, 20, 1), |seqs| {
            Ok(seqs
                .iter()
                .map(|s| match s.len() {
                    1 => one_hot(4, 5.0),
                    2 => one_hot(5, 5.0),
                    _ => one_hot(EOS, 5.0),
                })
                .collect())
        })
        .unwrap();
        assert_eq!(result, vec![START, 4, 5, EOS]);
    }

    #[test]
    fn min_length_suppresses_eos() {
        let result = beam_search(&params(5, 20, 1), |seqs| {
            Ok(seqs.iter().map(|_| {
                let mut row = one_hot(EOS, 9.0);
                row[6] = 1.0;
                row
            }).collect())
        })
        .unwrap();
        let eos_at = result.iter().skip(1).position(|&t| t == EOS).map(|p| p + 1);
        assert_eq!(eos_at, Some(5));
    }

    #[test]
    fn max_length_caps_sequence() {
        for beams in [1, 3] {
            let result = beam_search(&params(0, 6, beams), |seqs| {
                Ok(seqs.iter().map(|s| one_hot(3 + (s.len() % 4) as u32, 4.0)).collect())
            })
            .unwrap();
            assert!(result.len() <= 6, "{:?}", result);
        }
    }

    #[test]
    fn forced_tokens_are_placed() {
        let mut p = params(0, 5, 2);
        p.forced_bos_token_id = Some(BOS);
        p.forced_eos_token_id = Some(EOS);
        let result = beam_search(&p, |seqs| Ok(seqs.iter().map(|_| one_hot(6, 3.0)).collect())).unwrap();
        assert_eq!(result[1], BOS);
        assert_eq!(*result.last().unwrap(), EOS);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn no_repeat_ngram_blocks_loops() {
        let mut p = params(0, 30, 1);
        p.no_repeat_ngram_size = 3;
        // Model always prefers 4 then 5, forever.
        let result = beam_search(&p, |seqs| {
            Ok(seqs
                .iter()
                .map(|s| {
                    let mut row = vec![0.0; VOCAB];
                    let favourite = if s.last() == Some(&4) { 5 } else { 4 };
                    row[favourite] = 6.0;
                    row[7] = 1.0;
                    row
                })
                .collect())
        })
        .unwrap();
        let mut seen = std::collections::HashSet::new();
        for window in result.windows(3) {
            assert!(seen.insert(window.to_vec()), "repeated trigram in {:?}", result);
        }
    }

    #[test]
    fn beam_search_is_deterministic() {
        let run = || {
            beam_search(&params(2, 12, 4), |seqs| {
                Ok(seqs
                    .iter()
                    .map(|s| (0..VOCAB).map(|v| ((v * 7 + s.len() * 3) % 5) as f32).collect())
                    .collect())
            })
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn beam_search_can_beat_greedy() {
        // Step 1: token 3 looks best, but only token 4 leads to a confident finish.
        let model = |seqs: &[Vec<u32>]| -> Result<Vec<Vec<f32>>> {
            Ok(seqs
                .iter()
                .map(|s| match (s.len(), s.last()) {
                    (1, _) => vec![0.0, 0.0, f32::NEG_INFINITY, 2.0, 1.8, 0.0, 0.0, 0.0],
                    (2, Some(4)) => one_hot(EOS, 20.0),
                    _ => vec![1.0; VOCAB],
                })
                .collect())
        };
        let greedy = beam_search(&params(0, 4, 1), model).unwrap();
        let beam = beam_search(&params(0, 4, 3), model).unwrap();
        assert_eq!(greedy[1], 3);
        assert_eq!(beam, vec![START, 4, EOS]);
    }

    #[test]
    fn running_beam_at_max_length_outscores_early_finishes() {
        // EOS is cheap early on, after which token 5 repeats at almost no cost.
        let model = |seqs: &[Vec<u32>]| -> Result<Vec<Vec<f32>>> {
            Ok(seqs
                .iter()
                .map(|s| match (s.len(), s.last()) {
                    (1, _) => {
                        let mut row = vec![-10.0; VOCAB];
                        row[EOS as usize] = 2.0;
                        row[5] = 2.0;
                        row[6] = 2.0;
                        row
                    }
                    (_, Some(5)) => one_hot(5, 20.0),
                    (_, Some(6)) => one_hot(EOS, 10.0),
                    _ => vec![0.0; VOCAB],
                })
                .collect())
        };

        let mut p = params(0, 6, 2);
        p.early_stopping = false;
        let result = beam_search(&p, model).unwrap();
        assert_eq!(result, vec![START, 5, 5, 5, 5, 5]);

        // With early stopping the two early finishes settle the search
        p.early_stopping = true;
        let settled = beam_search(&p, model).unwrap();
        assert_eq!(settled, vec![START, EOS]);
    }
}
