/// The bootstrap standard library, evaluated against the root environment
/// at startup. Macro template locals carry a `__MACRO_` prefix to reduce
/// accidental capture; expansion is unhygienic.
pub const STDLIB: &str = r#"
;; ── core macros ──────────────────────────────────────────────

(defmacro defn [__MACRO_defn_name __MACRO_defn_params & __MACRO_defn_body]
  `(def ~__MACRO_defn_name
     (fn ~__MACRO_defn_name ~__MACRO_defn_params ~@__MACRO_defn_body)))

(defmacro and [& __MACRO_and_forms]
  (if (.seq __MACRO_and_forms)
    (if (.seq (.rest __MACRO_and_forms))
      `(let [__MACRO_and_head ~(.first __MACRO_and_forms)]
         (if __MACRO_and_head
           (and ~@(.rest __MACRO_and_forms))
           __MACRO_and_head))
      (.first __MACRO_and_forms))
    true))

(defmacro or [& __MACRO_or_forms]
  (if (.seq __MACRO_or_forms)
    (if (.seq (.rest __MACRO_or_forms))
      `(let [__MACRO_or_head ~(.first __MACRO_or_forms)]
         (if __MACRO_or_head
           __MACRO_or_head
           (or ~@(.rest __MACRO_or_forms))))
      (.first __MACRO_or_forms))
    nil))

(defmacro when [__MACRO_when_test & __MACRO_when_body]
  `(if ~__MACRO_when_test (do ~@__MACRO_when_body) nil))

(defmacro when-not [__MACRO_when_not_test & __MACRO_when_not_body]
  `(if ~__MACRO_when_not_test nil (do ~@__MACRO_when_not_body)))

(defmacro if-not [__MACRO_if_not_test __MACRO_if_not_then __MACRO_if_not_else]
  `(if ~__MACRO_if_not_test ~__MACRO_if_not_else ~__MACRO_if_not_then))

;; Pairs of test/result forms; a trailing lone form is the else branch.
(defmacro cond [& __MACRO_cond_clauses]
  (if (.seq __MACRO_cond_clauses)
    (if (.seq (.rest __MACRO_cond_clauses))
      `(if ~(.first __MACRO_cond_clauses)
         ~(.first (.rest __MACRO_cond_clauses))
         (cond ~@(.rest (.rest __MACRO_cond_clauses))))
      (.first __MACRO_cond_clauses))
    nil))

;; ── predicates ───────────────────────────────────────────────

(defn not [x] (if x false true))
(defn nil? [x] (.= x nil))
(defn some? [x] (not (nil? x)))
(defn identity [x] x)

;; ── arithmetic and comparison ────────────────────────────────

(defn + [& xs] (.reduce .+ 0 xs))
(defn * [& xs] (.reduce .* 1 xs))
(defn - [x & xs] (if (.seq xs) (.reduce .- x xs) (.- 0 x)))
(defn / [x & xs] (if (.seq xs) (.reduce ./ x xs) (./ 1 x)))

(defn < [a & more]
  (loop [x a ys (.seq more)]
    (if ys
      (if (.< x (.first ys))
        (recur (.first ys) (.next ys))
        false)
      true)))

(defn <= [a & more]
  (loop [x a ys (.seq more)]
    (if ys
      (if (.<= x (.first ys))
        (recur (.first ys) (.next ys))
        false)
      true)))

(defn > [a & more]
  (loop [x a ys (.seq more)]
    (if ys
      (if (.> x (.first ys))
        (recur (.first ys) (.next ys))
        false)
      true)))

(defn >= [a & more]
  (loop [x a ys (.seq more)]
    (if ys
      (if (.>= x (.first ys))
        (recur (.first ys) (.next ys))
        false)
      true)))

(defn = [a & more]
  (loop [x a ys (.seq more)]
    (if ys
      (if (.= x (.first ys))
        (recur (.first ys) (.next ys))
        false)
      true)))

(defn == [a & more]
  (loop [x a ys (.seq more)]
    (if ys
      (if (.== x (.first ys))
        (recur (.first ys) (.next ys))
        false)
      true)))

(defn inc [x] (.+ x 1))
(defn dec [x] (.- x 1))
(defn zero? [x] (.== x 0))
(defn pos? [x] (.> x 0))
(defn neg? [x] (.< x 0))

;; ── sequences ────────────────────────────────────────────────

(defn list [& xs] xs)
(defn seq [coll] (.seq coll))
(defn next [coll] (.next coll))
(defn conj [coll x] (.conj coll x))
(defn second [coll] (first (rest coll)))
(defn empty? [coll] (not (.seq coll)))

(def reduce
  (fn reduce
    ([f coll] (.reduce f coll))
    ([f init coll] (.reduce f init coll))))

(defn concat [& xs]
  (.reduce (fn [acc x] (.concat acc x)) (.list) xs))

(defn reverse [coll] (.reduce .conj (.list) coll))

(defn count [coll] (.reduce (fn [n _] (.+ n 1)) 0 coll))

(defn last [coll]
  (if (.seq coll)
    (.reduce (fn [a b] b) coll)
    nil))

(defn range [n]
  (loop [i (.- n 1) acc (.list)]
    (if (.< i 0)
      acc
      (recur (.- i 1) (.conj acc i)))))

(defn map [f coll]
  (loop [acc (.list) s (.seq coll)]
    (if s
      (recur (.conj acc (f (.first s))) (.next s))
      (reverse acc))))

(defn filter [pred coll]
  (loop [acc (.list) s (.seq coll)]
    (if s
      (recur (if (pred (.first s)) (.conj acc (.first s)) acc) (.next s))
      (reverse acc))))

;; ── io and misc ──────────────────────────────────────────────

(defn print [x] (.print x))
(defn println [x] (do (.print x) (.print "\n")))
(defn rand [] (.rand))
"#;
