//! 技术指标计算
//!
//! 从左到右单次遍历，每根K线的指标只使用该K线及之前的收盘价：
//! - SMA: 5 / 25 / 75 日简单移动平均
//! - EMA: 12 / 26 日指数移动平均，以前 N 日 SMA 作为初始值
//! - MACD: EMA12 - EMA26，信号线为 MACD 的 EMA9，柱状图为两者之差
//! - RSI: 14 日 Wilder 平滑
//!
//! 收盘价为空的缺口K线不进入任何窗口，直接沿用上一根K线的指标。

use crate::models::{Bar, EnrichedBar, Indicators};

pub const SMA_PERIODS: [usize; 3] = [5, 25, 75];
pub const EMA_FAST: usize = 12;
pub const EMA_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const RSI_PERIOD: usize = 14;

/// 指数移动平均
///
/// 前 period 个值的算术平均作为初始值，之后
/// EMA = 当前值 × k + 上一 EMA × (1 - k)，k = 2 / (period + 1)
#[derive(Debug, Clone)]
struct Ema {
    period: usize,
    multiplier: f64,
    seed_sum: f64,
    seen: usize,
    value: Option<f64>,
}

impl Ema {
    fn new(period: usize) -> Self {
        Self {
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
            seed_sum: 0.0,
            seen: 0,
            value: None,
        }
    }

    fn next(&mut self, input: f64) -> Option<f64> {
        self.value = match self.value {
            Some(prev) => Some(input * self.multiplier + prev * (1.0 - self.multiplier)),
            None => {
                self.seed_sum += input;
                self.seen += 1;
                (self.seen == self.period).then(|| self.seed_sum / self.period as f64)
            }
        };
        self.value
    }
}

/// Wilder 平滑的 RSI
///
/// 前 period 个涨跌幅的简单平均作为初始平均涨幅/跌幅，之后
/// avg = (上一 avg × (period - 1) + 当前值) / period
#[derive(Debug, Clone)]
struct WilderRsi {
    period: usize,
    prev_close: Option<f64>,
    gain_sum: f64,
    loss_sum: f64,
    seen: usize,
    averages: Option<(f64, f64)>,
}

impl WilderRsi {
    fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            gain_sum: 0.0,
            loss_sum: 0.0,
            seen: 0,
            averages: None,
        }
    }

    fn next(&mut self, close: f64) -> Option<f64> {
        let prev = self.prev_close.replace(close)?;
        let change = close - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let period = self.period as f64;

        self.averages = match self.averages {
            Some((avg_gain, avg_loss)) => Some((
                (avg_gain * (period - 1.0) + gain) / period,
                (avg_loss * (period - 1.0) + loss) / period,
            )),
            None => {
                self.gain_sum += gain;
                self.loss_sum += loss;
                self.seen += 1;
                (self.seen == self.period).then(|| (self.gain_sum / period, self.loss_sum / period))
            }
        };

        self.averages.map(|(avg_gain, avg_loss)| rsi_from_averages(avg_gain, avg_loss))
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// 单次计算过程中的滚动状态
struct EngineState {
    closes: Vec<f64>,
    ema_fast: Ema,
    ema_slow: Ema,
    signal: Ema,
    rsi: WilderRsi,
}

impl EngineState {
    fn new() -> Self {
        Self {
            closes: Vec::new(),
            ema_fast: Ema::new(EMA_FAST),
            ema_slow: Ema::new(EMA_SLOW),
            signal: Ema::new(MACD_SIGNAL),
            rsi: WilderRsi::new(RSI_PERIOD),
        }
    }

    fn sma(&self, period: usize) -> Option<f64> {
        let len = self.closes.len();
        if len < period {
            return None;
        }
        let sum: f64 = self.closes[len - period..].iter().sum();
        Some(sum / period as f64)
    }

    fn push(&mut self, close: f64) -> Indicators {
        self.closes.push(close);

        let ema_12 = self.ema_fast.next(close);
        let ema_26 = self.ema_slow.next(close);
        let macd = match (ema_12, ema_26) {
            (Some(fast), Some(slow)) => Some(fast - slow),
            _ => None,
        };
        let macd_signal = macd.and_then(|m| self.signal.next(m));
        let macd_hist = match (macd, macd_signal) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        };

        Indicators {
            sma_5: self.sma(SMA_PERIODS[0]),
            sma_25: self.sma(SMA_PERIODS[1]),
            sma_75: self.sma(SMA_PERIODS[2]),
            ema_12,
            ema_26,
            macd,
            macd_signal,
            macd_hist,
            rsi_14: self.rsi.next(close),
        }
    }
}

/// 指标引擎
///
/// 无状态，每次调用 `enrich` 都从头计算，结果只取决于输入序列。
#[derive(Debug, Default, Clone, Copy)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    /// 为每根K线计算指标
    ///
    /// # 参数
    /// - bars: 已按日期升序、已剔除盘中K线的序列
    pub fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let mut state = EngineState::new();
        let mut carried = Indicators::default();
        let mut result = Vec::with_capacity(bars.len());

        for bar in bars {
            let indicators = match bar.close {
                Some(close) => state.push(close),
                None => carried,
            };
            carried = indicators;
            result.push(EnrichedBar {
                bar: bar.clone(),
                indicators,
            });
        }

        result
    }
}
